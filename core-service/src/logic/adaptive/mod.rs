//! Adaptive Module
//!
//! Learned scoring adjustments: rule types, the stores that own them, and
//! the applier that consults them at score-computation time.

pub mod types;
pub mod store;
pub mod applier;


pub use types::{
    AdaptiveRule, KeywordBoostConfig, PatternRuleConfig, PenaltyConfig, RuleKind, ThresholdConfig,
};
pub use store::{sort_for_application, FileRuleStore, MemoryRuleStore, RuleStore, StoreError};
pub use applier::{AppliedRule, RuleSnapshot, ORIGINAL_TYPE_PENALTY_RATIO};
