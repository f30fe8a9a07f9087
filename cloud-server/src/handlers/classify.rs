//! Classification handler

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use triage_core::logic::config::SafetyConfig;
use triage_core::{classify_report, ClassificationResult, ReportInput, RuleSnapshot};
use uuid::Uuid;
use validator::Validate;

use crate::error::parse_uuid;
use crate::models::{load_active_rules, EmergencyReport};
use crate::{AppError, AppResult, AppState};

#[derive(Debug, Deserialize, Validate)]
pub struct ClassifyRequest {
    #[validate(length(min = 1, max = 64))]
    pub report_id: Option<String>,
    pub report: Option<ReportInput>,
}

#[derive(Debug, Serialize)]
pub struct ClassifyResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_id: Option<Uuid>,
    #[serde(flatten)]
    pub result: ClassificationResult,
}

/// Snapshot of the active rules, or `None` when adaptive scoring is off
async fn rule_snapshot(state: &AppState) -> AppResult<Option<RuleSnapshot>> {
    if !SafetyConfig::is_adaptive_rules_enabled() {
        return Ok(None);
    }
    let rules = load_active_rules(&state.pool).await?;
    Ok(Some(RuleSnapshot::new(rules)))
}

/// Classify a stored report (result persisted) or an inline one
pub async fn classify(
    State(state): State<AppState>,
    Json(req): Json<ClassifyRequest>,
) -> AppResult<Json<ClassifyResponse>> {
    req.validate()?;

    match (req.report_id, req.report) {
        (Some(raw_id), None) => {
            let id = parse_uuid(&raw_id, "report_id")?;
            let report = EmergencyReport::find_by_id(&state.pool, id)
                .await?
                .ok_or_else(|| AppError::NotFound("Report not found".to_string()))?;

            let snapshot = rule_snapshot(&state).await?;
            let result = classify_report(&report.to_input(), &state.table, snapshot.as_ref());

            EmergencyReport::save_classification(&state.pool, id, &result)
                .await?
                .ok_or_else(|| AppError::NotFound("Report not found".to_string()))?;

            tracing::info!(
                "Report {} classified as {} ({:.2})",
                id,
                result.emergency_type,
                result.confidence
            );

            Ok(Json(ClassifyResponse { report_id: Some(id), result }))
        }
        (None, Some(input)) => {
            let snapshot = rule_snapshot(&state).await?;
            let result = classify_report(&input, &state.table, snapshot.as_ref());
            tracing::debug!("Inline report classified as {}", result.emergency_type);
            Ok(Json(ClassifyResponse { report_id: None, result }))
        }
        _ => Err(AppError::ValidationError(
            "exactly one of report_id or report is required".to_string(),
        )),
    }
}
