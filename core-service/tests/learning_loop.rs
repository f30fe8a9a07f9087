//! End-to-end: corrections → learned rules → changed classifications.

use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use triage_core::{
    analyze_corrections, classify_features, classify_report, run_learning, Correction,
    EmergencyType, FeatureSet, FileRuleStore, KeywordProfile, LearningConfig, MemoryRuleStore,
    ReportInput, RuleSnapshot, RuleStore, ScoringTable,
};

fn correction(from: EmergencyType, to: EmergencyType, tags: &[&str]) -> Correction {
    Correction {
        id: Uuid::new_v4(),
        report_id: Uuid::new_v4(),
        original_type: from,
        corrected_type: to,
        original_confidence: 0.45,
        issue_categories: vec!["wrong_type".to_string()],
        ai_features: json!({ "tags": tags }),
        created_at: Utc::now(),
    }
}

fn history() -> Vec<Correction> {
    let mut corrections: Vec<Correction> = (0..6)
        .map(|_| correction(EmergencyType::Flood, EmergencyType::Accident, &["car", "road"]))
        .collect();
    corrections.push(correction(EmergencyType::Fire, EmergencyType::Medical, &["person"]));
    corrections
}

fn generic() -> &'static ScoringTable {
    ScoringTable::for_profile(KeywordProfile::Generic)
}

#[test]
fn flood_keywords_outweigh_single_vehicle_token() {
    let features = FeatureSet::from_tokens(["flood", "flooded", "street", "car"]);
    let result = classify_features(&features, generic(), None);
    assert_eq!(result.emergency_type, EmergencyType::Flood);
}

#[test]
fn collision_token_alone_forces_accident() {
    let features = FeatureSet::from_tokens(["collission"]);
    let result = classify_features(&features, generic(), None);
    assert_eq!(result.emergency_type, EmergencyType::Accident);
    assert!((result.confidence - 0.95).abs() < 1e-6);
}

#[test]
fn confidence_stays_in_unit_range_for_keyword_floods() {
    let message = "flood fire crash blood water smoke collision injured ".repeat(200);
    let report = ReportInput {
        message: Some(message),
        image_size: Some(5 * 1024 * 1024),
        ..Default::default()
    };

    for profile in [KeywordProfile::Generic, KeywordProfile::Philippine] {
        let result = classify_report(&report, ScoringTable::for_profile(profile), None);
        assert!((0.0..=1.0).contains(&result.confidence));
        for (_, score) in result.scores.iter() {
            assert!((0.0..=1.0).contains(&score));
        }
    }
}

#[test]
fn analysis_of_history() {
    let analysis = analyze_corrections(&history(), &LearningConfig::default());

    assert_eq!(analysis.statistics.total_corrections, 7);
    assert_eq!(analysis.statistics.patterns_found, 2);
    assert_eq!(analysis.statistics.suggestions.len(), 1);
    assert_eq!(analysis.statistics.suggestions[0].occurrences, 6);
    assert_eq!(analysis.statistics.issue_category_counts.get("wrong_type"), Some(&7));
}

#[test]
fn learned_rule_redirects_classification() {
    let store = MemoryRuleStore::new();
    let summary = run_learning(&history(), &store, &LearningConfig::default()).unwrap();
    assert_eq!(summary.rules_created, 1);
    assert_eq!(summary.total_patterns, 2);

    let snapshot = RuleSnapshot::load(&store).unwrap();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot.rules()[0].name, "auto_flood_to_accident");

    // flood and accident tie on one keyword each; the table order picks flood
    let features = FeatureSet::from_tokens(["inundated", "car"]);
    let before = classify_features(&features, generic(), None);
    let after = classify_features(&features, generic(), Some(&snapshot));

    assert_eq!(before.emergency_type, EmergencyType::Flood);
    assert_eq!(after.emergency_type, EmergencyType::Accident);
    assert_eq!(after.applied_rules, vec!["auto_flood_to_accident"]);
}

#[test]
fn relearning_bumps_version_in_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rules.json");
    let config = LearningConfig::default();

    {
        let store = FileRuleStore::open(&path).unwrap();
        run_learning(&history(), &store, &config).unwrap();
    }

    let store = FileRuleStore::open(&path).unwrap();
    let second = run_learning(&history(), &store, &config).unwrap();
    assert_eq!(second.rules_created, 0);
    assert_eq!(second.rules_updated, 1);

    let rule = store.find_by_name("auto_flood_to_accident").unwrap().unwrap();
    assert_eq!(rule.version, 2);
    assert!(rule.confidence_boost <= 0.5);

    let reopened = FileRuleStore::open(&path).unwrap();
    let persisted = reopened.find_by_name("auto_flood_to_accident").unwrap().unwrap();
    assert_eq!(persisted, rule);
}

#[test]
fn deactivated_rule_is_not_applied() {
    let store = MemoryRuleStore::new();
    run_learning(&history(), &store, &LearningConfig::default()).unwrap();

    let rule = store.find_by_name("auto_flood_to_accident").unwrap().unwrap();
    store.set_active(rule.id, false).unwrap();

    let snapshot = RuleSnapshot::load(&store).unwrap();
    assert!(snapshot.is_empty());
}
