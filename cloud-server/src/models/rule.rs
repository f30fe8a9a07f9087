//! Adaptive rule model
//!
//! Postgres mirror of the core `RuleStore` contract: unique names, point
//! lookup, active scan in application order, and version-checked updates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use triage_core::{AdaptiveRule, RuleKind};
use uuid::Uuid;

use crate::AppResult;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StoredRule {
    pub id: Uuid,
    pub name: String,
    pub rule_type: String,
    pub config_data: serde_json::Value,
    pub confidence_boost: f32,
    pub learned_from_corrections_count: i32,
    pub version: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRule {
    pub is_active: bool,
}

pub(crate) fn to_db(n: u32) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

pub(crate) fn from_db(n: i32) -> u32 {
    u32::try_from(n).unwrap_or(0)
}

impl TryFrom<StoredRule> for AdaptiveRule {
    type Error = String;

    fn try_from(row: StoredRule) -> Result<Self, Self::Error> {
        let rule = RuleKind::from_parts(&row.rule_type, row.config_data)
            .map_err(|e| format!("bad {} config: {}", row.rule_type, e))?;

        Ok(AdaptiveRule {
            id: row.id,
            name: row.name,
            rule,
            confidence_boost: row.confidence_boost,
            learned_from_corrections_count: from_db(row.learned_from_corrections_count),
            version: from_db(row.version),
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl StoredRule {
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, StoredRule>("SELECT * FROM adaptive_rules WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, StoredRule>("SELECT * FROM adaptive_rules WHERE name = $1")
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// Active rules, most-proven first
    pub async fn list_active(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, StoredRule>(
            r#"
            SELECT * FROM adaptive_rules
            WHERE is_active = true
            ORDER BY learned_from_corrections_count DESC, name ASC
            "#
        )
        .fetch_all(pool)
        .await
    }

    /// Insert; `None` if the name is already taken
    pub async fn insert(pool: &PgPool, rule: &AdaptiveRule) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, StoredRule>(
            r#"
            INSERT INTO adaptive_rules
                (id, name, rule_type, config_data, confidence_boost,
                 learned_from_corrections_count, version, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (name) DO NOTHING
            RETURNING *
            "#
        )
        .bind(rule.id)
        .bind(&rule.name)
        .bind(rule.kind())
        .bind(rule.rule.config_data())
        .bind(rule.confidence_boost)
        .bind(to_db(rule.learned_from_corrections_count))
        .bind(to_db(rule.version))
        .bind(rule.is_active)
        .bind(rule.created_at)
        .bind(rule.updated_at)
        .fetch_optional(pool)
        .await
    }

    /// Replace only if the stored version is still `expected_version`
    pub async fn update_versioned(
        pool: &PgPool,
        rule: &AdaptiveRule,
        expected_version: u32,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, StoredRule>(
            r#"
            UPDATE adaptive_rules
            SET rule_type = $3,
                config_data = $4,
                confidence_boost = $5,
                learned_from_corrections_count = $6,
                version = $7,
                updated_at = $8
            WHERE id = $1 AND version = $2
            RETURNING *
            "#
        )
        .bind(rule.id)
        .bind(to_db(expected_version))
        .bind(rule.kind())
        .bind(rule.rule.config_data())
        .bind(rule.confidence_boost)
        .bind(to_db(rule.learned_from_corrections_count))
        .bind(to_db(rule.version))
        .bind(rule.updated_at)
        .fetch_optional(pool)
        .await
    }

    pub async fn set_active(pool: &PgPool, id: Uuid, active: bool) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, StoredRule>(
            r#"
            UPDATE adaptive_rules
            SET is_active = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#
        )
        .bind(id)
        .bind(active)
        .fetch_optional(pool)
        .await
    }
}

/// Decode rows in order; undecodable rows are logged and skipped
pub fn decode_rules(rows: Vec<StoredRule>) -> Vec<AdaptiveRule> {
    rows.into_iter()
        .filter_map(|row| {
            let name = row.name.clone();
            match AdaptiveRule::try_from(row) {
                Ok(rule) => Some(rule),
                Err(e) => {
                    tracing::warn!("Ignoring adaptive rule {}: {}", name, e);
                    None
                }
            }
        })
        .collect()
}

/// Active rules in application order
pub async fn load_active_rules(pool: &PgPool) -> AppResult<Vec<AdaptiveRule>> {
    let rows = StoredRule::list_active(pool).await?;
    Ok(decode_rules(rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use triage_core::logic::adaptive::KeywordBoostConfig;
    use triage_core::EmergencyType;

    fn stored(rule: &AdaptiveRule) -> StoredRule {
        StoredRule {
            id: rule.id,
            name: rule.name.clone(),
            rule_type: rule.kind().to_string(),
            config_data: rule.rule.config_data(),
            confidence_boost: rule.confidence_boost,
            learned_from_corrections_count: to_db(rule.learned_from_corrections_count),
            version: to_db(rule.version),
            is_active: rule.is_active,
            created_at: rule.created_at,
            updated_at: rule.updated_at,
        }
    }

    fn keyword_rule() -> AdaptiveRule {
        let mut rule = AdaptiveRule::new(
            "auto_flood_to_accident",
            RuleKind::KeywordBoost(KeywordBoostConfig {
                original_type: EmergencyType::Flood,
                corrected_type: EmergencyType::Accident,
                features: vec!["car".into(), "road".into()],
            }),
            0.26,
        );
        rule.learned_from_corrections_count = 6;
        rule
    }

    #[test]
    fn test_row_round_trip() {
        let rule = keyword_rule();
        let back = AdaptiveRule::try_from(stored(&rule)).unwrap();
        assert_eq!(back, rule);
    }

    #[test]
    fn test_unknown_rule_type() {
        let mut row = stored(&keyword_rule());
        row.rule_type = "magic".into();
        assert!(AdaptiveRule::try_from(row).is_err());
    }

    #[test]
    fn test_decode_skips_bad_rows() {
        let good = keyword_rule();
        let mut bad = stored(&keyword_rule());
        bad.name = "broken".into();
        bad.config_data = serde_json::json!({"unexpected": true});

        let rules = decode_rules(vec![bad, stored(&good)]);
        assert_eq!(rules, vec![good]);
    }

    #[test]
    fn test_count_conversion() {
        assert_eq!(from_db(-3), 0);
        assert_eq!(to_db(u32::MAX), i32::MAX);
        assert_eq!(from_db(to_db(42)), 42);
    }
}
