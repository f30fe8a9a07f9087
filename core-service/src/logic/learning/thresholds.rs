//! Learning thresholds and noise gates.

use serde::{Deserialize, Serialize};

/// Corrections needed before a pattern yields a suggestion
pub const MIN_PATTERN_COUNT: u32 = 3;

/// Occurrences for `medium` priority
pub const MEDIUM_PRIORITY_COUNT: u32 = 5;

/// Occurrences for `high` priority
pub const HIGH_PRIORITY_COUNT: u32 = 10;

/// Features kept per pattern
pub const TOP_FEATURES: usize = 10;

/// Features carried into a suggested rule
pub const SUGGESTION_FEATURES: usize = 5;

/// Example corrections kept per pattern
pub const MAX_EXAMPLES: usize = 5;

/// Suggested boost = base + step × occurrences
pub const BOOST_BASE: f32 = 0.2;
pub const BOOST_STEP: f32 = 0.01;

/// No stored rule may carry a larger boost
pub const MAX_RULE_BOOST: f32 = 0.5;

/// Low-priority suggestions below this never reach the store
pub const STORE_MIN_LOW_OCCURRENCES: u32 = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningConfig {
    pub min_pattern_count: u32,
    pub medium_priority_count: u32,
    pub high_priority_count: u32,
    pub top_features: usize,
    pub suggestion_features: usize,
    pub max_examples: usize,
    pub boost_base: f32,
    pub boost_step: f32,
    pub max_rule_boost: f32,
    pub store_min_low_occurrences: u32,
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            min_pattern_count: MIN_PATTERN_COUNT,
            medium_priority_count: MEDIUM_PRIORITY_COUNT,
            high_priority_count: HIGH_PRIORITY_COUNT,
            top_features: TOP_FEATURES,
            suggestion_features: SUGGESTION_FEATURES,
            max_examples: MAX_EXAMPLES,
            boost_base: BOOST_BASE,
            boost_step: BOOST_STEP,
            max_rule_boost: MAX_RULE_BOOST,
            store_min_low_occurrences: STORE_MIN_LOW_OCCURRENCES,
        }
    }
}

impl LearningConfig {
    pub fn suggested_boost(&self, occurrences: u32) -> f32 {
        self.boost_base + self.boost_step * occurrences as f32
    }
}
