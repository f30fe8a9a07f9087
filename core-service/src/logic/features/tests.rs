//! Tests for feature extraction

use serde_json::json;

use super::{extract_features, vision_tokens, FeatureSet, ReportInput};

#[test]
fn test_tags_accept_strings_and_objects() {
    let vision = json!({
        "tags": ["Flood", {"name": "Water"}, {"label": "Street"}, "", {"confidence": 0.9}],
    });
    let tokens = vision_tokens(&vision);
    assert_eq!(tokens, vec!["flood", "water", "street"]);
}

#[test]
fn test_objects_accept_strings_and_objects() {
    let vision = json!({
        "objects": ["Car", {"object": "truck"}, {"name": "Person"}, {"object": "  "}],
    });
    let tokens = vision_tokens(&vision);
    assert_eq!(tokens, vec!["car", "truck", "person"]);
}

#[test]
fn test_caption_and_description_are_split() {
    let vision = json!({
        "caption": "Cars Stuck in flood",
        "description": {"text": "heavy rain"},
    });
    let tokens = vision_tokens(&vision);
    assert_eq!(tokens, vec!["cars", "stuck", "in", "flood", "heavy", "rain"]);
}

#[test]
fn test_malformed_vision_is_empty() {
    assert!(vision_tokens(&json!("not an object")).is_empty());
    assert!(vision_tokens(&json!({"tags": "flood"})).is_empty());
    assert!(vision_tokens(&json!(null)).is_empty());
}

#[test]
fn test_extract_combines_vision_and_text() {
    let input = ReportInput {
        vision: Some(json!({"tags": ["smoke"], "caption": "building on fire"})),
        message: Some("Please HELP  quickly".to_string()),
        location: Some("Quezon City".to_string()),
        file_name: Some("uploads/IMG_0001.jpg".to_string()),
        image_size: Some(2048),
    };
    let features = extract_features(&input);

    assert!(features.has_vision);
    assert_eq!(features.image_size, Some(2048));
    for token in ["smoke", "building", "fire", "help", "quezon", "city", "uploads/img_0001.jpg"] {
        assert!(features.tokens().any(|t| t == token), "missing token {}", token);
    }
    // "on" appears once even though it is in the caption only
    assert_eq!(features.tokens().filter(|t| *t == "on").count(), 1);
}

#[test]
fn test_absent_fields_are_empty() {
    let features = extract_features(&ReportInput::default());
    assert!(features.is_empty());
    assert!(!features.has_vision);
    assert_eq!(features.text(), "");
}

#[test]
fn test_feature_set_dedups_and_lowercases() {
    let set = FeatureSet::from_tokens(["Flood", "flood", " FLOOD ", "car"]);
    assert_eq!(set.len(), 2);
    assert_eq!(set.text(), "car flood");
    assert!(set.contains("FLO"));
    assert!(set.any_token_contains("ar"));
    assert!(!set.contains(""));
}

#[test]
fn test_bulk_build_matches_incremental() {
    let tokens: Vec<String> = (0..2000).map(|i| format!("tok{:04}", i)).collect();
    let bulk = FeatureSet::from_tokens(&tokens);

    let mut incremental = FeatureSet::new();
    for token in &tokens {
        incremental.insert(token);
    }

    assert_eq!(bulk.len(), 2000);
    assert_eq!(bulk, incremental);
    assert!(bulk.text().starts_with("tok0000 tok0001"));
}
