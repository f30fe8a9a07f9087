//! Rule Applier
//!
//! Applies a snapshot of active rules to the base per-category scores before
//! the final pick. Rules never mutate the store; a snapshot is taken once per
//! classification request.

use std::collections::HashMap;

use regex::{Regex, RegexBuilder};

use super::store::{sort_for_application, RuleStore, StoreError};
use super::types::{AdaptiveRule, KeywordBoostConfig, PatternRuleConfig, RuleKind};
use crate::logic::classify::{CategoryScores, EmergencyType};
use crate::logic::features::FeatureSet;

/// Share of a keyword boost taken away from the historically wrong label
pub const ORIGINAL_TYPE_PENALTY_RATIO: f32 = 0.5;

/// One rule that fired and what it changed
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedRule {
    pub name: String,
    pub kind: &'static str,
    pub adjustments: Vec<(EmergencyType, f32)>,
}

impl AppliedRule {
    pub fn describe(&self) -> String {
        let changes: Vec<String> = self
            .adjustments
            .iter()
            .map(|(category, delta)| format!("{} {:+.2}", category, delta))
            .collect();
        format!("Adaptive rule '{}' ({}): {}", self.name, self.kind, changes.join(", "))
    }
}

/// Read-only view of the active rules for one request
#[derive(Debug, Clone, Default)]
pub struct RuleSnapshot {
    rules: Vec<AdaptiveRule>,
    // None marks a pattern that failed to compile
    regex_cache: HashMap<String, Option<Regex>>,
}

impl RuleSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from any rule list; inactive rules are dropped
    pub fn new(rules: Vec<AdaptiveRule>) -> Self {
        let mut rules: Vec<AdaptiveRule> = rules.into_iter().filter(|r| r.is_active).collect();
        sort_for_application(&mut rules);

        let mut regex_cache = HashMap::new();
        for rule in &rules {
            if let RuleKind::PatternRule(config) = &rule.rule {
                for pattern in &config.context_patterns {
                    regex_cache.entry(pattern.clone()).or_insert_with(|| {
                        match RegexBuilder::new(pattern).case_insensitive(true).build() {
                            Ok(re) => Some(re),
                            Err(e) => {
                                log::warn!("Rule '{}' has invalid pattern '{}': {}", rule.name, pattern, e);
                                None
                            }
                        }
                    });
                }
            }
        }

        Self { rules, regex_cache }
    }

    pub fn load(store: &dyn RuleStore) -> Result<Self, StoreError> {
        Ok(Self::new(store.load_active_rules()?))
    }

    pub fn rules(&self) -> &[AdaptiveRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Apply every rule in order. `leader` is the base classifier's winner.
    pub fn apply(
        &self,
        scores: &mut CategoryScores,
        leader: EmergencyType,
        features: &FeatureSet,
    ) -> Vec<AppliedRule> {
        let mut applied = Vec::new();

        for rule in &self.rules {
            let boost = rule.confidence_boost;
            let adjustments = match &rule.rule {
                RuleKind::KeywordBoost(config) => {
                    if !keyword_boost_matches(config, leader, features) {
                        continue;
                    }
                    vec![
                        (config.corrected_type, boost),
                        (config.original_type, -boost * ORIGINAL_TYPE_PENALTY_RATIO),
                    ]
                }
                RuleKind::PatternRule(config) => {
                    if !self.pattern_rule_matches(config, features) {
                        continue;
                    }
                    vec![(config.boost_type, boost)]
                }
                RuleKind::Threshold(config) => {
                    if scores.get(config.category) < config.min_score {
                        continue;
                    }
                    vec![(config.category, boost)]
                }
                RuleKind::Penalty(config) => {
                    if !config.keywords.iter().any(|k| features.contains(k)) {
                        continue;
                    }
                    vec![(config.category, -boost)]
                }
            };

            for (category, delta) in &adjustments {
                scores.add(*category, *delta);
            }
            log::debug!("Adaptive rule '{}' applied", rule.name);
            applied.push(AppliedRule {
                name: rule.name.clone(),
                kind: rule.kind(),
                adjustments,
            });
        }

        applied
    }

    fn pattern_rule_matches(&self, config: &PatternRuleConfig, features: &FeatureSet) -> bool {
        if !config.required_keywords.iter().all(|k| features.contains(k)) {
            return false;
        }
        if config.excluded_keywords.iter().any(|k| features.contains(k)) {
            return false;
        }
        config.context_patterns.iter().all(|p| {
            matches!(self.regex_cache.get(p), Some(Some(re)) if re.is_match(features.text()))
        })
    }
}

fn keyword_boost_matches(config: &KeywordBoostConfig, leader: EmergencyType, features: &FeatureSet) -> bool {
    if config.original_type != leader {
        return false;
    }
    config.features.is_empty() || config.features.iter().any(|f| features.any_token_contains(f))
}
