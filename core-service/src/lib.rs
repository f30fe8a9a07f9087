//! Emergency Triage Core
//!
//! Deterministic, auditable classification of emergency reports plus the
//! correction-driven learning loop that adjusts future scoring.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      CLASSIFICATION PATH                       │
//! │  ReportInput ─▶ features ─▶ classify (score) ─▶ adaptive ─▶ decide │
//! │                                                   ▲            │
//! ├───────────────────────────────────────────────────┼────────────┤
//! │                      LEARNING PATH (batch)        │            │
//! │  Corrections ─▶ learning::analyze ─▶ suggestions ─▶ RuleStore   │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The rule store is the only coupling point between the two paths.

pub mod constants;
pub mod logic;

pub use logic::adaptive::{
    AdaptiveRule, FileRuleStore, MemoryRuleStore, RuleKind, RuleSnapshot, RuleStore, StoreError,
};
pub use logic::classify::{
    ClassificationResult, EmergencyType, KeywordProfile, ScoringTable,
};
pub use logic::features::{extract_features, FeatureSet, ReportInput};
pub use logic::learning::{
    analyze_corrections, run_learning, Correction, CorrectionAnalysis, LearningConfig,
    LearningSummary, Pattern, Suggestion,
};
pub use logic::pipeline::{classify_features, classify_report};
