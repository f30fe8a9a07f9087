//! Correction model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use triage_core::{Correction, EmergencyType};
use uuid::Uuid;
use validator::Validate;

use super::report::EmergencyReport;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CorrectionRecord {
    pub id: Uuid,
    pub report_id: Uuid,
    pub original_type: String,
    pub corrected_type: String,
    pub original_confidence: f32,
    pub issue_categories: Vec<String>,
    pub ai_features: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCorrection {
    #[validate(length(min = 1, max = 20))]
    pub corrected_type: String,
    #[serde(default)]
    #[validate(length(max = 20))]
    pub issue_categories: Vec<String>,
}

#[derive(Debug, Deserialize, Validate, Default)]
pub struct CorrectionFilter {
    #[validate(range(min = 1, max = 500))]
    pub limit: Option<i64>,
    #[validate(range(min = 0))]
    pub offset: Option<i64>,
}

impl TryFrom<CorrectionRecord> for Correction {
    type Error = String;

    fn try_from(row: CorrectionRecord) -> Result<Self, Self::Error> {
        Ok(Correction {
            id: row.id,
            report_id: row.report_id,
            original_type: row.original_type.parse()?,
            corrected_type: row.corrected_type.parse()?,
            original_confidence: row.original_confidence,
            issue_categories: row.issue_categories,
            ai_features: row.ai_features,
            created_at: row.created_at,
        })
    }
}

impl CorrectionRecord {
    /// Record a correction, snapshotting the report's current classification
    pub async fn create(
        pool: &PgPool,
        report: &EmergencyReport,
        original_type: EmergencyType,
        corrected_type: EmergencyType,
        issue_categories: &[String],
    ) -> Result<Self, sqlx::Error> {
        let ai_features = report
            .vision_analysis
            .clone()
            .unwrap_or_else(|| serde_json::json!({}));

        sqlx::query_as::<_, CorrectionRecord>(
            r#"
            INSERT INTO classification_corrections
                (report_id, original_type, corrected_type, original_confidence, issue_categories, ai_features)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#
        )
        .bind(report.id)
        .bind(original_type.as_str())
        .bind(corrected_type.as_str())
        .bind(report.confidence.unwrap_or(0.0))
        .bind(issue_categories)
        .bind(&ai_features)
        .fetch_one(pool)
        .await
    }

    pub async fn list(pool: &PgPool, filter: &CorrectionFilter) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, CorrectionRecord>(
            r#"
            SELECT * FROM classification_corrections
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#
        )
        .bind(filter.limit.unwrap_or(50))
        .bind(filter.offset.unwrap_or(0))
        .fetch_all(pool)
        .await
    }

    /// Full history for analysis; rows with unknown types are logged and skipped
    pub async fn load_all(pool: &PgPool) -> Result<Vec<Correction>, sqlx::Error> {
        let rows = sqlx::query_as::<_, CorrectionRecord>(
            "SELECT * FROM classification_corrections ORDER BY created_at ASC"
        )
        .fetch_all(pool)
        .await?;

        let total = rows.len();
        let corrections: Vec<Correction> = rows
            .into_iter()
            .filter_map(|row| {
                let id = row.id;
                match Correction::try_from(row) {
                    Ok(c) => Some(c),
                    Err(e) => {
                        tracing::warn!("Skipping correction {}: {}", id, e);
                        None
                    }
                }
            })
            .collect();

        tracing::debug!("Loaded {}/{} corrections", corrections.len(), total);
        Ok(corrections)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record() -> CorrectionRecord {
        CorrectionRecord {
            id: Uuid::new_v4(),
            report_id: Uuid::new_v4(),
            original_type: "flood".into(),
            corrected_type: "accident".into(),
            original_confidence: 0.45,
            issue_categories: vec!["wrong_type".into()],
            ai_features: json!({"tags": ["car"]}),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_record_to_correction() {
        let c = Correction::try_from(record()).unwrap();
        assert_eq!(c.original_type, EmergencyType::Flood);
        assert_eq!(c.corrected_type, EmergencyType::Accident);
        assert_eq!(c.issue_categories, vec!["wrong_type"]);
    }

    #[test]
    fn test_unknown_type_rejected() {
        let bad = CorrectionRecord { corrected_type: "earthquake".into(), ..record() };
        assert!(Correction::try_from(bad).is_err());
    }

    #[test]
    fn test_request_validation() {
        let ok = CreateCorrection { corrected_type: "fire".into(), issue_categories: vec![] };
        assert!(ok.validate().is_ok());

        let empty = CreateCorrection { corrected_type: String::new(), issue_categories: vec![] };
        assert!(empty.validate().is_err());

        let filter = CorrectionFilter { limit: Some(0), offset: None };
        assert!(filter.validate().is_err());
        assert!(CorrectionFilter::default().validate().is_ok());
    }
}
