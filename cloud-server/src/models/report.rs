//! Report model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use triage_core::{ClassificationResult, EmergencyType, ReportInput};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EmergencyReport {
    pub id: Uuid,
    pub message: Option<String>,
    pub location: Option<String>,
    pub image_path: Option<String>,
    pub image_size: Option<i64>,
    pub vision_analysis: Option<serde_json::Value>,
    pub emergency_type: Option<String>,
    pub confidence: Option<f32>,
    pub analysis: Option<String>,
    pub details: Option<serde_json::Value>,
    pub classified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl EmergencyReport {
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, EmergencyReport>("SELECT * FROM emergency_reports WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Everything the feature extractor reads from a stored report
    pub fn to_input(&self) -> ReportInput {
        ReportInput {
            vision: self.vision_analysis.clone(),
            message: self.message.clone(),
            location: self.location.clone(),
            file_name: self.image_path.clone(),
            image_size: self.image_size.and_then(|s| u64::try_from(s).ok()),
        }
    }

    /// Type of the last classification, if any
    pub fn classified_type(&self) -> Option<EmergencyType> {
        self.emergency_type
            .as_deref()
            .and_then(|t| t.parse().ok())
    }

    pub async fn save_classification(
        pool: &PgPool,
        id: Uuid,
        result: &ClassificationResult,
    ) -> Result<Option<Self>, sqlx::Error> {
        let details = serde_json::json!({
            "details": result.details,
            "scores": result.scores,
            "applied_rules": result.applied_rules,
            "decided_by": result.decided_by,
        });

        sqlx::query_as::<_, EmergencyReport>(
            r#"
            UPDATE emergency_reports
            SET emergency_type = $2,
                confidence = $3,
                analysis = $4,
                details = $5,
                classified_at = NOW()
            WHERE id = $1
            RETURNING *
            "#
        )
        .bind(id)
        .bind(result.emergency_type.as_str())
        .bind(result.confidence)
        .bind(&result.analysis)
        .bind(&details)
        .fetch_optional(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn report() -> EmergencyReport {
        EmergencyReport {
            id: Uuid::new_v4(),
            message: Some("Flooded street near the river".into()),
            location: Some("Marikina".into()),
            image_path: Some("uploads/flood.jpg".into()),
            image_size: Some(2_000_000),
            vision_analysis: Some(json!({"tags": ["water"]})),
            emergency_type: Some("flood".into()),
            confidence: Some(0.8),
            analysis: None,
            details: None,
            classified_at: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_to_input() {
        let input = report().to_input();
        assert_eq!(input.image_size, Some(2_000_000));
        assert_eq!(input.file_name.as_deref(), Some("uploads/flood.jpg"));
        assert!(input.vision.is_some());
    }

    #[test]
    fn test_negative_size_dropped() {
        let r = EmergencyReport { image_size: Some(-1), ..report() };
        assert_eq!(r.to_input().image_size, None);
    }

    #[test]
    fn test_classified_type() {
        assert_eq!(report().classified_type(), Some(EmergencyType::Flood));
        let unclassified = EmergencyReport { emergency_type: None, ..report() };
        assert_eq!(unclassified.classified_type(), None);
    }
}
