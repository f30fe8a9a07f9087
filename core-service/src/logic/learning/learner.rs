//! Rule Learner
//!
//! Turns suggestions into stored rules. A rule name is derived from its
//! pattern, so re-learning the same pattern updates the existing rule instead
//! of duplicating it.

use chrono::Utc;

use super::analyzer::analyze_corrections;
use super::thresholds::LearningConfig;
use super::types::{CorrectionSource, LearningSummary, Suggestion, SuggestionPriority};
use crate::logic::adaptive::{AdaptiveRule, RuleStore, StoreError};
use crate::logic::config::SafetyConfig;

#[derive(Debug, Clone, PartialEq)]
pub enum UpsertOutcome {
    Created(AdaptiveRule),
    Updated(AdaptiveRule),
}

impl UpsertOutcome {
    pub fn rule(&self) -> &AdaptiveRule {
        match self {
            UpsertOutcome::Created(rule) | UpsertOutcome::Updated(rule) => rule,
        }
    }
}

/// Low-priority suggestions with few occurrences stay out of the store
pub fn passes_store_gate(suggestion: &Suggestion, config: &LearningConfig) -> bool {
    !(suggestion.priority == SuggestionPriority::Low
        && suggestion.occurrences < config.store_min_low_occurrences)
}

pub fn rule_from_suggestion(suggestion: &Suggestion, config: &LearningConfig) -> AdaptiveRule {
    let proposed = &suggestion.suggested_rule;
    let mut rule = AdaptiveRule::new(
        proposed.name.clone(),
        proposed.rule.clone(),
        proposed.boost.min(config.max_rule_boost),
    );
    rule.learned_from_corrections_count = suggestion.occurrences;
    rule
}

/// Fold a fresh suggestion into an existing rule.
///
/// The version always bumps, the learned count accumulates, and the boost
/// only ever grows (up to the cap). The rule body is replaced so its feature
/// list tracks the latest analysis.
pub fn merge_suggestion(existing: &AdaptiveRule, suggestion: &Suggestion, config: &LearningConfig) -> AdaptiveRule {
    let proposed = &suggestion.suggested_rule;
    let mut rule = existing.clone();
    rule.rule = proposed.rule.clone();
    rule.version = existing.version.saturating_add(1);
    rule.learned_from_corrections_count = existing
        .learned_from_corrections_count
        .saturating_add(suggestion.occurrences);
    rule.confidence_boost = existing
        .confidence_boost
        .max(proposed.boost)
        .min(config.max_rule_boost);
    rule.updated_at = Utc::now();
    rule
}

/// Create the rule for a suggestion, or update it if the name already exists
pub fn upsert_rule(
    store: &dyn RuleStore,
    suggestion: &Suggestion,
    config: &LearningConfig,
) -> Result<UpsertOutcome, StoreError> {
    match store.find_by_name(&suggestion.suggested_rule.name)? {
        Some(existing) => {
            let merged = merge_suggestion(&existing, suggestion, config);
            let stored = store.update(merged, existing.version)?;
            Ok(UpsertOutcome::Updated(stored))
        }
        None => {
            let stored = store.insert(rule_from_suggestion(suggestion, config))?;
            Ok(UpsertOutcome::Created(stored))
        }
    }
}

/// Apply every suggestion independently; one failed write never aborts the rest
pub fn learn_from_suggestions(
    store: &dyn RuleStore,
    suggestions: &[Suggestion],
    total_patterns: usize,
    config: &LearningConfig,
) -> LearningSummary {
    let mut summary = LearningSummary {
        total_patterns,
        ..Default::default()
    };

    for suggestion in suggestions {
        if !passes_store_gate(suggestion, config) {
            log::debug!(
                "Skipping {} ({} occurrences, {} priority)",
                suggestion.suggested_rule.name,
                suggestion.occurrences,
                suggestion.priority.as_str()
            );
            summary.rules_skipped += 1;
            continue;
        }

        match upsert_rule(store, suggestion, config) {
            Ok(UpsertOutcome::Created(rule)) => {
                log::info!("Created adaptive rule {} (boost {:.2})", rule.name, rule.confidence_boost);
                summary.rules_created += 1;
            }
            Ok(UpsertOutcome::Updated(rule)) => {
                log::info!("Updated adaptive rule {} to v{}", rule.name, rule.version);
                summary.rules_updated += 1;
            }
            Err(e) => {
                log::warn!("Failed to store rule {}: {}", suggestion.suggested_rule.name, e);
                summary.rules_failed += 1;
            }
        }
    }

    summary
}

/// Full learning pass: analyze every correction, then upsert the suggestions
pub fn run_learning(
    source: &dyn CorrectionSource,
    store: &dyn RuleStore,
    config: &LearningConfig,
) -> Result<LearningSummary, StoreError> {
    let corrections = source.load_corrections()?;
    let analysis = analyze_corrections(&corrections, config);
    let suggestions = &analysis.statistics.suggestions;

    if !SafetyConfig::is_learning_enabled() {
        log::warn!("Learning disabled, {} suggestions not stored", suggestions.len());
        return Ok(LearningSummary {
            rules_skipped: suggestions.len(),
            total_patterns: analysis.statistics.patterns_found,
            ..Default::default()
        });
    }

    let summary = learn_from_suggestions(store, suggestions, analysis.statistics.patterns_found, config);
    log::info!(
        "Learning run: {} created, {} updated, {} failed, {} patterns",
        summary.rules_created,
        summary.rules_updated,
        summary.rules_failed,
        summary.total_patterns
    );
    Ok(summary)
}
