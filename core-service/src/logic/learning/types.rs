//! Learning Types
//!
//! Corrections in, patterns and suggestions out.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::logic::adaptive::{RuleKind, StoreError};
use crate::logic::classify::EmergencyType;

// ============================================================================
// CORRECTIONS
// ============================================================================

/// A reviewer's correction of one classification. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Correction {
    pub id: Uuid,
    pub report_id: Uuid,
    pub original_type: EmergencyType,
    pub corrected_type: EmergencyType,
    pub original_confidence: f32,
    #[serde(default)]
    pub issue_categories: Vec<String>,
    /// Vision-analysis snapshot taken when the correction was made
    #[serde(default)]
    pub ai_features: Value,
    pub created_at: DateTime<Utc>,
}

/// Read access to the full correction history
pub trait CorrectionSource {
    fn load_corrections(&self) -> Result<Vec<Correction>, StoreError>;
}

impl CorrectionSource for Vec<Correction> {
    fn load_corrections(&self) -> Result<Vec<Correction>, StoreError> {
        Ok(self.clone())
    }
}

// ============================================================================
// PATTERNS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureCount {
    pub feature: String,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternExample {
    pub correction_id: Uuid,
    pub report_id: Uuid,
    pub original_confidence: f32,
    pub issue_categories: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// One systematic misclassification, recomputed on every analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    pub original_type: EmergencyType,
    pub corrected_type: EmergencyType,
    pub count: u32,
    pub avg_confidence: f32,
    /// Most frequent co-occurring features, highest first
    pub common_features: Vec<FeatureCount>,
    pub issue_categories: Vec<String>,
    pub examples: Vec<PatternExample>,
}

impl Pattern {
    /// Stable key, e.g. `flood_to_accident`
    pub fn key(&self) -> String {
        pattern_key(self.original_type, self.corrected_type)
    }

    /// Deterministic name of the rule learned from this pattern
    pub fn rule_name(&self) -> String {
        format!("auto_{}", self.key())
    }

    pub fn is_misclassification(&self) -> bool {
        self.original_type != self.corrected_type
    }
}

pub fn pattern_key(original: EmergencyType, corrected: EmergencyType) -> String {
    format!("{}_to_{}", original, corrected)
}

// ============================================================================
// SUGGESTIONS
// ============================================================================

/// Operator trust level for a suggestion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionPriority {
    High,
    Medium,
    Low,
}

impl SuggestionPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            SuggestionPriority::High => "high",
            SuggestionPriority::Medium => "medium",
            SuggestionPriority::Low => "low",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestedRule {
    pub name: String,
    pub rule: RuleKind,
    pub boost: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub priority: SuggestionPriority,
    /// Key of the pattern this came from
    pub pattern: String,
    pub occurrences: u32,
    pub suggested_rule: SuggestedRule,
}

// ============================================================================
// RESULTS
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisStatistics {
    pub total_corrections: usize,
    pub patterns_found: usize,
    pub suggestions: Vec<Suggestion>,
    /// How often each reviewer issue tag was used
    pub issue_category_counts: BTreeMap<String, u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorrectionAnalysis {
    pub patterns: Vec<Pattern>,
    pub statistics: AnalysisStatistics,
}

/// Outcome of one learning run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearningSummary {
    pub rules_created: usize,
    pub rules_updated: usize,
    /// Suggestions whose store write failed (logged and skipped)
    pub rules_failed: usize,
    /// Suggestions held back by the store's noise gate
    pub rules_skipped: usize,
    pub total_patterns: usize,
}
