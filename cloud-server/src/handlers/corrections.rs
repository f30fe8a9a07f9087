//! Correction handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use triage_core::{analyze_corrections, CorrectionAnalysis, EmergencyType, LearningConfig};
use validator::Validate;

use crate::error::parse_uuid;
use crate::models::{CorrectionFilter, CorrectionRecord, CreateCorrection, EmergencyReport};
use crate::{AppError, AppResult, AppState};

/// Record a reviewer correction against a classified report
pub async fn create(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Json(req): Json<CreateCorrection>,
) -> AppResult<(StatusCode, Json<CorrectionRecord>)> {
    let report_id = parse_uuid(&raw_id, "report id")?;
    req.validate()?;

    let corrected: EmergencyType = req
        .corrected_type
        .parse()
        .map_err(AppError::ValidationError)?;

    let report = EmergencyReport::find_by_id(&state.pool, report_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Report not found".to_string()))?;

    let original = report.classified_type().ok_or_else(|| {
        AppError::ValidationError("Report has not been classified yet".to_string())
    })?;

    let issues: Vec<String> = req
        .issue_categories
        .iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect();

    let record = CorrectionRecord::create(&state.pool, &report, original, corrected, &issues).await?;

    tracing::info!("Correction {} recorded: {} → {}", record.id, original, corrected);

    Ok((StatusCode::CREATED, Json(record)))
}

/// Recent corrections, newest first
pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<CorrectionFilter>,
) -> AppResult<Json<Vec<CorrectionRecord>>> {
    filter.validate()?;
    let records = CorrectionRecord::list(&state.pool, &filter).await?;
    Ok(Json(records))
}

/// Patterns and suggestions over the whole correction history
pub async fn analysis(State(state): State<AppState>) -> AppResult<Json<CorrectionAnalysis>> {
    let corrections = CorrectionRecord::load_all(&state.pool).await?;
    let analysis = analyze_corrections(&corrections, &LearningConfig::default());
    Ok(Json(analysis))
}
