//! Learning Module
//!
//! Correction history → patterns → suggestions → stored adaptive rules.

pub mod thresholds;
pub mod types;
pub mod analyzer;
pub mod learner;

pub use thresholds::LearningConfig;
pub use types::{
    pattern_key, AnalysisStatistics, Correction, CorrectionAnalysis, CorrectionSource,
    FeatureCount, LearningSummary, Pattern, PatternExample, SuggestedRule, Suggestion,
    SuggestionPriority,
};
pub use analyzer::{analyze_corrections, priority_for, suggest};
pub use learner::{
    learn_from_suggestions, merge_suggestion, passes_store_gate, rule_from_suggestion, run_learning,
    upsert_rule, UpsertOutcome,
};
