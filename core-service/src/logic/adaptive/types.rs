//! Adaptive Rule Types
//!
//! Persisted, versioned scoring adjustments learned from corrections.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::logic::classify::EmergencyType;

// ============================================================================
// RULE KINDS
// ============================================================================

/// Steers away from a historically wrong label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordBoostConfig {
    pub original_type: EmergencyType,
    pub corrected_type: EmergencyType,
    /// Empty means "always applies when `original_type` leads"
    #[serde(default)]
    pub features: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternRuleConfig {
    #[serde(default)]
    pub required_keywords: Vec<String>,
    #[serde(default)]
    pub excluded_keywords: Vec<String>,
    /// Regular expressions that must all match the combined text
    #[serde(default)]
    pub context_patterns: Vec<String>,
    pub boost_type: EmergencyType,
}

/// Adds the rule's boost when `category` already scores at least `min_score`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    pub category: EmergencyType,
    pub min_score: f32,
}

/// Subtracts the rule's boost from `category` when any keyword appears
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PenaltyConfig {
    pub category: EmergencyType,
    pub keywords: Vec<String>,
}

/// Closed set of rule kinds, each with its own config payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "config", rename_all = "snake_case")]
pub enum RuleKind {
    KeywordBoost(KeywordBoostConfig),
    PatternRule(PatternRuleConfig),
    Threshold(ThresholdConfig),
    Penalty(PenaltyConfig),
}

impl RuleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleKind::KeywordBoost(_) => "keyword_boost",
            RuleKind::PatternRule(_) => "pattern_rule",
            RuleKind::Threshold(_) => "threshold",
            RuleKind::Penalty(_) => "penalty",
        }
    }

    /// Config payload alone, as stored in a `config_data` column
    pub fn config_data(&self) -> Value {
        match serde_json::to_value(self) {
            Ok(Value::Object(mut map)) => map.remove("config").unwrap_or(Value::Null),
            _ => Value::Null,
        }
    }

    /// Rebuild from a stored `(rule_type, config_data)` pair
    pub fn from_parts(kind: &str, config: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(json!({ "kind": kind, "config": config }))
    }
}

// ============================================================================
// ADAPTIVE RULE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdaptiveRule {
    pub id: Uuid,
    /// Unique; derived deterministically from the pattern it was learned from
    pub name: String,
    pub rule: RuleKind,
    pub confidence_boost: f32,
    pub learned_from_corrections_count: u32,
    /// Starts at 1, strictly increases on every update
    pub version: u32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AdaptiveRule {
    pub fn new(name: impl Into<String>, rule: RuleKind, confidence_boost: f32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            rule,
            confidence_boost,
            learned_from_corrections_count: 0,
            version: 1,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn kind(&self) -> &'static str {
        self.rule.as_str()
    }
}
