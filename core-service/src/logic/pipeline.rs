//! Classification Pipeline
//!
//! features → base scores → adaptive adjustments → decision.
//!
//! The base classifier's verdict is computed first and stays fixed as the
//! "leader" that keyword-boost rules key on. Rules only adjust a copy of the
//! score vector; the decision rules then run on the adjusted scores.

use super::adaptive::RuleSnapshot;
use super::classify::{decide, score_features, ClassificationResult, ScoringTable};
use super::config::SafetyConfig;
use super::features::{extract_features, FeatureSet, ReportInput};

/// Classify an already-extracted feature set
pub fn classify_features(
    features: &FeatureSet,
    table: &ScoringTable,
    rules: Option<&RuleSnapshot>,
) -> ClassificationResult {
    let sheet = score_features(features, table);
    let base = decide(features, &sheet, &sheet.scores, table);

    let snapshot = match rules {
        Some(snapshot) if !snapshot.is_empty() && SafetyConfig::is_adaptive_rules_enabled() => snapshot,
        _ => return base,
    };

    let mut adjusted = sheet.scores;
    let applied = snapshot.apply(&mut adjusted, base.emergency_type, features);
    if applied.is_empty() {
        return base;
    }

    let mut result = decide(features, &sheet, &adjusted, table);
    result.details.extend(applied.iter().map(|rule| rule.describe()));
    result.applied_rules = applied.into_iter().map(|rule| rule.name).collect();

    if result.emergency_type != base.emergency_type {
        log::info!(
            "Adaptive rules moved verdict {} → {} ({})",
            base.emergency_type,
            result.emergency_type,
            result.applied_rules.join(", ")
        );
    }

    result
}

/// Extract features from a raw report and classify them
pub fn classify_report(
    report: &ReportInput,
    table: &ScoringTable,
    rules: Option<&RuleSnapshot>,
) -> ClassificationResult {
    let features = extract_features(report);
    log::debug!("Extracted {} feature tokens", features.len());
    classify_features(&features, table, rules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::adaptive::{
        AdaptiveRule, KeywordBoostConfig, PatternRuleConfig, PenaltyConfig, RuleKind,
    };
    use crate::logic::classify::{DecisionSource, EmergencyType, KeywordProfile};

    fn table() -> &'static ScoringTable {
        ScoringTable::for_profile(KeywordProfile::Generic)
    }

    fn flood_to_accident(boost: f32) -> AdaptiveRule {
        AdaptiveRule::new(
            "auto_flood_to_accident",
            RuleKind::KeywordBoost(KeywordBoostConfig {
                original_type: EmergencyType::Flood,
                corrected_type: EmergencyType::Accident,
                features: vec!["car".into()],
            }),
            boost,
        )
    }

    #[test]
    fn test_no_rules_matches_base_classifier() {
        let features = FeatureSet::from_tokens(["flooded", "street"]);
        let base = crate::logic::classify::classify(&features, table());

        let without = classify_features(&features, table(), None);
        let empty = classify_features(&features, table(), Some(&RuleSnapshot::empty()));

        assert_eq!(without, base);
        assert_eq!(empty, base);
        assert!(without.applied_rules.is_empty());
    }

    #[test]
    fn test_keyword_boost_changes_verdict() {
        // flood and accident tie; generic table order makes flood the base verdict
        let features = FeatureSet::from_tokens(["inundated", "car"]);
        let snapshot = RuleSnapshot::new(vec![flood_to_accident(0.5)]);

        let result = classify_features(&features, table(), Some(&snapshot));

        assert_eq!(result.emergency_type, EmergencyType::Accident);
        assert!((result.confidence - 0.85).abs() < 1e-6);
        assert_eq!(result.applied_rules, vec!["auto_flood_to_accident"]);
        assert!(result
            .details
            .iter()
            .any(|d| d.contains("auto_flood_to_accident")));
        assert!(result.confidence >= 0.0 && result.confidence <= 1.0);
    }

    #[test]
    fn test_keyword_boost_needs_matching_feature() {
        let features = FeatureSet::from_tokens(["flood", "river"]);
        let snapshot = RuleSnapshot::new(vec![flood_to_accident(0.5)]);

        let result = classify_features(&features, table(), Some(&snapshot));

        assert_eq!(result.emergency_type, EmergencyType::Flood);
        assert!(result.applied_rules.is_empty());
    }

    #[test]
    fn test_rules_can_redirect_to_other() {
        let features = FeatureSet::from_tokens(["smoke", "flame", "candle"]);
        let false_alarm = AdaptiveRule::new(
            "auto_fire_to_other",
            RuleKind::KeywordBoost(KeywordBoostConfig {
                original_type: EmergencyType::Fire,
                corrected_type: EmergencyType::Other,
                features: vec![],
            }),
            0.5,
        );
        let candle = AdaptiveRule::new(
            "candle_is_other",
            RuleKind::PatternRule(PatternRuleConfig {
                required_keywords: vec!["candle".into()],
                excluded_keywords: vec![],
                context_patterns: vec![],
                boost_type: EmergencyType::Other,
            }),
            0.9,
        );
        let snapshot = RuleSnapshot::new(vec![false_alarm, candle]);

        let base = classify_features(&features, table(), None);
        assert_eq!(base.emergency_type, EmergencyType::Fire);

        let result = classify_features(&features, table(), Some(&snapshot));
        assert_eq!(result.emergency_type, EmergencyType::Other);
        assert_eq!(result.decided_by, DecisionSource::Score);
        assert!((result.confidence - 1.0).abs() < 1e-6);
        assert_eq!(result.applied_rules.len(), 2);
    }

    #[test]
    fn test_collision_override_survives_rules() {
        let features = FeatureSet::from_tokens(["collission", "fire", "smoke"]);
        let penalty = AdaptiveRule::new(
            "penalize_accident",
            RuleKind::Penalty(PenaltyConfig {
                category: EmergencyType::Accident,
                keywords: vec!["smoke".into()],
            }),
            0.5,
        );
        let snapshot = RuleSnapshot::new(vec![penalty]);

        let result = classify_features(&features, table(), Some(&snapshot));

        assert_eq!(result.emergency_type, EmergencyType::Accident);
        assert_eq!(result.decided_by, DecisionSource::CollisionOverride);
    }

    #[test]
    fn test_classify_report_end_to_end() {
        let report = ReportInput {
            message: Some("Baha sa kalsada, flooded street".into()),
            ..Default::default()
        };
        let ph = ScoringTable::for_profile(KeywordProfile::Philippine);
        let result = classify_report(&report, ph, None);
        assert_eq!(result.emergency_type, EmergencyType::Flood);
    }
}
