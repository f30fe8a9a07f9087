//! Correction Analyzer
//!
//! Groups the full correction history by (original → corrected) pair, ranks
//! the co-occurring features, and emits rule suggestions for patterns that
//! recur often enough to not be noise. Always recomputed from scratch.

use std::collections::{BTreeMap, BTreeSet};

use super::thresholds::LearningConfig;
use super::types::{
    pattern_key, AnalysisStatistics, Correction, CorrectionAnalysis, FeatureCount, Pattern,
    PatternExample, SuggestedRule, Suggestion, SuggestionPriority,
};
use crate::logic::adaptive::{KeywordBoostConfig, RuleKind};
use crate::logic::classify::EmergencyType;
use crate::logic::features::vision_tokens;

#[derive(Default)]
struct PatternAccumulator {
    count: u32,
    confidence_sum: f64,
    features: BTreeMap<String, u32>,
    issues: BTreeSet<String>,
    examples: Vec<PatternExample>,
}

/// Analyze every correction into ranked patterns and suggestions
pub fn analyze_corrections(corrections: &[Correction], config: &LearningConfig) -> CorrectionAnalysis {
    let mut groups: BTreeMap<(EmergencyType, EmergencyType), PatternAccumulator> = BTreeMap::new();
    let mut issue_category_counts: BTreeMap<String, u32> = BTreeMap::new();

    for correction in corrections {
        let acc = groups
            .entry((correction.original_type, correction.corrected_type))
            .or_default();

        acc.count += 1;
        acc.confidence_sum += correction.original_confidence as f64;

        // a token counts once per correction
        let tokens: BTreeSet<String> = vision_tokens(&correction.ai_features).into_iter().collect();
        for token in tokens {
            *acc.features.entry(token).or_insert(0) += 1;
        }

        let issues: BTreeSet<&str> = correction
            .issue_categories
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect();
        for issue in issues {
            acc.issues.insert(issue.to_string());
            *issue_category_counts.entry(issue.to_string()).or_insert(0) += 1;
        }

        if acc.examples.len() < config.max_examples {
            acc.examples.push(PatternExample {
                correction_id: correction.id,
                report_id: correction.report_id,
                original_confidence: correction.original_confidence,
                issue_categories: correction.issue_categories.clone(),
                created_at: correction.created_at,
            });
        }
    }

    let mut patterns: Vec<Pattern> = groups
        .into_iter()
        .map(|((original_type, corrected_type), acc)| Pattern {
            original_type,
            corrected_type,
            count: acc.count,
            avg_confidence: (acc.confidence_sum / acc.count as f64) as f32,
            common_features: top_features(acc.features, config.top_features),
            issue_categories: acc.issues.into_iter().collect(),
            examples: acc.examples,
        })
        .collect();

    // Most systematic error first; stable sort keeps pair order for ties
    patterns.sort_by(|a, b| b.count.cmp(&a.count));

    let suggestions: Vec<Suggestion> = patterns
        .iter()
        .filter(|p| p.count >= config.min_pattern_count && p.is_misclassification())
        .map(|p| suggest(p, config))
        .collect();

    log::info!(
        "Analyzed {} corrections: {} patterns, {} suggestions",
        corrections.len(),
        patterns.len(),
        suggestions.len()
    );

    CorrectionAnalysis {
        statistics: AnalysisStatistics {
            total_corrections: corrections.len(),
            patterns_found: patterns.len(),
            suggestions,
            issue_category_counts,
        },
        patterns,
    }
}

fn top_features(counts: BTreeMap<String, u32>, limit: usize) -> Vec<FeatureCount> {
    let mut features: Vec<FeatureCount> = counts
        .into_iter()
        .map(|(feature, count)| FeatureCount { feature, count })
        .collect();
    // BTreeMap order is alphabetical, so the stable sort breaks ties by name
    features.sort_by(|a, b| b.count.cmp(&a.count));
    features.truncate(limit);
    features
}

pub fn priority_for(occurrences: u32, config: &LearningConfig) -> SuggestionPriority {
    if occurrences >= config.high_priority_count {
        SuggestionPriority::High
    } else if occurrences >= config.medium_priority_count {
        SuggestionPriority::Medium
    } else {
        SuggestionPriority::Low
    }
}

/// Keyword-boost suggestion for one pattern
pub fn suggest(pattern: &Pattern, config: &LearningConfig) -> Suggestion {
    let features = pattern
        .common_features
        .iter()
        .take(config.suggestion_features)
        .map(|f| f.feature.clone())
        .collect();

    Suggestion {
        priority: priority_for(pattern.count, config),
        pattern: pattern_key(pattern.original_type, pattern.corrected_type),
        occurrences: pattern.count,
        suggested_rule: SuggestedRule {
            name: pattern.rule_name(),
            rule: RuleKind::KeywordBoost(KeywordBoostConfig {
                original_type: pattern.original_type,
                corrected_type: pattern.corrected_type,
                features,
            }),
            boost: config.suggested_boost(pattern.count),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use serde_json::json;
    use uuid::Uuid;

    fn correction(from: EmergencyType, to: EmergencyType, confidence: f32, tags: &[&str], issues: &[&str]) -> Correction {
        Correction {
            id: Uuid::new_v4(),
            report_id: Uuid::new_v4(),
            original_type: from,
            corrected_type: to,
            original_confidence: confidence,
            issue_categories: issues.iter().map(|s| s.to_string()).collect(),
            ai_features: json!({ "tags": tags }),
            created_at: Utc::now(),
        }
    }

    fn repeat(n: usize, from: EmergencyType, to: EmergencyType, tags: &[&str]) -> Vec<Correction> {
        (0..n).map(|_| correction(from, to, 0.8, tags, &[])).collect()
    }

    #[test]
    fn test_no_corrections() {
        let analysis = analyze_corrections(&[], &LearningConfig::default());
        assert_eq!(analysis.statistics.total_corrections, 0);
        assert_eq!(analysis.statistics.patterns_found, 0);
        assert!(analysis.statistics.suggestions.is_empty());
        assert!(analysis.patterns.is_empty());
    }

    #[test]
    fn test_groups_by_pair_and_averages_confidence() {
        let corrections = vec![
            correction(EmergencyType::Flood, EmergencyType::Accident, 0.6, &[], &[]),
            correction(EmergencyType::Flood, EmergencyType::Accident, 0.8, &[], &[]),
            correction(EmergencyType::Fire, EmergencyType::Other, 0.9, &[], &[]),
        ];
        let analysis = analyze_corrections(&corrections, &LearningConfig::default());

        assert_eq!(analysis.statistics.patterns_found, 2);
        let top = &analysis.patterns[0];
        assert_eq!(top.key(), "flood_to_accident");
        assert_eq!(top.count, 2);
        assert!((top.avg_confidence - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_patterns_sorted_by_count() {
        let mut corrections = repeat(2, EmergencyType::Fire, EmergencyType::Medical, &[]);
        corrections.extend(repeat(5, EmergencyType::Other, EmergencyType::Flood, &[]));
        corrections.extend(repeat(3, EmergencyType::Accident, EmergencyType::Flood, &[]));

        let analysis = analyze_corrections(&corrections, &LearningConfig::default());
        let counts: Vec<u32> = analysis.patterns.iter().map(|p| p.count).collect();
        assert_eq!(counts, vec![5, 3, 2]);
    }

    #[test]
    fn test_one_suggestion_per_recurring_pair() {
        let mut corrections = repeat(4, EmergencyType::Flood, EmergencyType::Accident, &["car"]);
        corrections.extend(repeat(2, EmergencyType::Fire, EmergencyType::Medical, &[]));

        let analysis = analyze_corrections(&corrections, &LearningConfig::default());
        let suggestions = &analysis.statistics.suggestions;
        assert_eq!(suggestions.len(), 1);

        let s = &suggestions[0];
        assert_eq!(s.occurrences, 4);
        assert_eq!(s.pattern, "flood_to_accident");
        assert_eq!(s.priority, SuggestionPriority::Low);
        assert_eq!(s.suggested_rule.name, "auto_flood_to_accident");
        assert!((s.suggested_rule.boost - 0.24).abs() < 1e-6);
        match &s.suggested_rule.rule {
            RuleKind::KeywordBoost(config) => {
                assert_eq!(config.original_type, EmergencyType::Flood);
                assert_eq!(config.corrected_type, EmergencyType::Accident);
                assert_eq!(config.features, vec!["car"]);
            }
            other => panic!("unexpected rule kind {:?}", other),
        }
    }

    #[test]
    fn test_priority_bands() {
        let config = LearningConfig::default();
        assert_eq!(priority_for(3, &config), SuggestionPriority::Low);
        assert_eq!(priority_for(5, &config), SuggestionPriority::Medium);
        assert_eq!(priority_for(9, &config), SuggestionPriority::Medium);
        assert_eq!(priority_for(10, &config), SuggestionPriority::High);
    }

    #[test]
    fn test_same_type_corrections_never_suggest() {
        let corrections = repeat(6, EmergencyType::Fire, EmergencyType::Fire, &["smoke"]);
        let analysis = analyze_corrections(&corrections, &LearningConfig::default());
        assert_eq!(analysis.statistics.patterns_found, 1);
        assert!(analysis.statistics.suggestions.is_empty());
    }

    #[test]
    fn test_feature_ranking_and_caps() {
        let mut corrections = Vec::new();
        for i in 0..12 {
            // "car" in all, "road" in half, plus one unique tag each
            let unique = format!("tag{:02}", i);
            let mut tags = vec!["car", unique.as_str()];
            if i % 2 == 0 {
                tags.push("road");
            }
            corrections.push(correction(EmergencyType::Flood, EmergencyType::Accident, 0.5, &tags, &["wrong_type"]));
        }

        let analysis = analyze_corrections(&corrections, &LearningConfig::default());
        let pattern = &analysis.patterns[0];

        assert_eq!(pattern.common_features.len(), 10);
        assert_eq!(pattern.common_features[0], FeatureCount { feature: "car".into(), count: 12 });
        assert_eq!(pattern.common_features[1], FeatureCount { feature: "road".into(), count: 6 });
        assert_eq!(pattern.common_features[2].feature, "tag00");
        assert_eq!(pattern.examples.len(), 5);
        assert_eq!(pattern.issue_categories, vec!["wrong_type"]);
        assert_eq!(analysis.statistics.issue_category_counts.get("wrong_type"), Some(&12));

        let s = &analysis.statistics.suggestions[0];
        assert_eq!(s.priority, SuggestionPriority::High);
        match &s.suggested_rule.rule {
            RuleKind::KeywordBoost(config) => assert_eq!(config.features.len(), 5),
            other => panic!("unexpected rule kind {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_tokens_count_once_per_correction() {
        let c = Correction {
            ai_features: json!({"tags": ["water"], "caption": "water water everywhere"}),
            ..correction(EmergencyType::Other, EmergencyType::Flood, 0.7, &[], &[])
        };
        let analysis = analyze_corrections(&[c], &LearningConfig::default());
        let water = analysis.patterns[0]
            .common_features
            .iter()
            .find(|f| f.feature == "water")
            .unwrap();
        assert_eq!(water.count, 1);
    }

    #[test]
    fn test_rerun_is_identical() {
        let base = Utc::now();
        let corrections: Vec<Correction> = (0..6)
            .map(|i| Correction {
                created_at: base - Duration::minutes(i),
                ..correction(EmergencyType::Medical, EmergencyType::Fire, 0.65, &["smoke", "person"], &["missed_fire"])
            })
            .collect();

        let config = LearningConfig::default();
        assert_eq!(analyze_corrections(&corrections, &config), analyze_corrections(&corrections, &config));
    }
}
