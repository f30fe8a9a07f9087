//! Classify Module
//!
//! Keyword-weighted base classifier for emergency reports.
//!
//! ## Structure
//! - `types`: Core types (EmergencyType, CategoryScores, ClassificationResult)
//! - `rules`: Scoring tables, override tokens and thresholds
//! - `classifier`: Scoring and decision logic
//!
//! ## Usage
//! ```ignore
//! use triage_core::logic::classify::{classify, KeywordProfile, ScoringTable};
//!
//! let table = ScoringTable::for_profile(KeywordProfile::Philippine);
//! let result = classify(&features, table);
//! ```

pub mod types;
pub mod rules;
pub mod classifier;

pub use types::{
    clamp_unit,
    CategoryScores,
    ClassificationResult,
    DecisionSource,
    EmergencyType,
};

pub use rules::{
    CategoryRule,
    ClassifierThresholds,
    ImageSizeBand,
    KeywordProfile,
    OverrideTable,
    ScoringTable,
    TieBreak,
    ACTIVATION_THRESHOLD,
    COLLISION_CONFIDENCE,
};

pub use classifier::{classify, decide, leading_category, score_features, ScoreSheet};
