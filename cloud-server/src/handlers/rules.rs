//! Adaptive rule handlers

use axum::{
    extract::{Path, State},
    Json,
};
use triage_core::{run_learning, AdaptiveRule, LearningConfig, LearningSummary};

use crate::error::parse_uuid;
use crate::models::{load_active_rules, StoredRule, UpdateRule};
use crate::store::{PgCorrectionSource, PgRuleStore};
use crate::{AppError, AppResult, AppState};

/// Active rules in application order
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<AdaptiveRule>>> {
    let rules = load_active_rules(&state.pool).await?;
    Ok(Json(rules))
}

/// Analyze all corrections and upsert the resulting rule suggestions
pub async fn learn(State(state): State<AppState>) -> AppResult<Json<LearningSummary>> {
    let store = PgRuleStore::new(state.pool.clone());
    let source = PgCorrectionSource::new(state.pool.clone());

    let summary = tokio::task::spawn_blocking(move || {
        run_learning(&source, &store, &LearningConfig::default())
    })
    .await
    .map_err(|e| AppError::InternalError(format!("Learning task failed: {}", e)))??;

    tracing::info!(
        "Learning run: {} created, {} updated, {} skipped, {} failed",
        summary.rules_created,
        summary.rules_updated,
        summary.rules_skipped,
        summary.rules_failed
    );

    Ok(Json(summary))
}

/// Manual activation toggle
pub async fn update(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Json(req): Json<UpdateRule>,
) -> AppResult<Json<AdaptiveRule>> {
    let id = parse_uuid(&raw_id, "rule id")?;

    let row = StoredRule::set_active(&state.pool, id, req.is_active)
        .await?
        .ok_or_else(|| AppError::NotFound("Rule not found".to_string()))?;

    tracing::info!("Rule {} {}", row.name, if req.is_active { "activated" } else { "deactivated" });

    let rule = AdaptiveRule::try_from(row).map_err(AppError::InternalError)?;
    Ok(Json(rule))
}
