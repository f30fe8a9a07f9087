//! Report → FeatureSet extraction
//!
//! Input: raw vision-analysis JSON (tags, objects, caption/description) plus
//! the report's text fields. Absent or malformed fields are treated as empty.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::set::FeatureSet;

/// Raw inputs for one report
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportInput {
    /// Vision-analysis output, shape `{tags, objects, caption, description}`
    #[serde(default)]
    pub vision: Option<Value>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    /// Uploaded file name or storage path
    #[serde(default)]
    pub file_name: Option<String>,
    /// Image size in bytes
    #[serde(default)]
    pub image_size: Option<u64>,
}

/// Extract the feature set for a report
pub fn extract_features(input: &ReportInput) -> FeatureSet {
    let mut features = FeatureSet::new();

    if let Some(vision) = &input.vision {
        let tokens = vision_tokens(vision);
        features.has_vision = !tokens.is_empty();
        features.extend(tokens);
    }

    for text in [&input.message, &input.location, &input.file_name].into_iter().flatten() {
        features.extend(text.split_whitespace());
    }

    features.image_size = input.image_size;
    features
}

/// Tokens contributed by a vision-analysis blob.
///
/// Also used on the `ai_features` snapshot stored with each correction.
pub fn vision_tokens(vision: &Value) -> Vec<String> {
    let mut tokens = Vec::new();

    // (a) tags: "name" or {name|label}
    if let Some(tags) = vision.get("tags").and_then(Value::as_array) {
        for tag in tags {
            if let Some(name) = entry_name(tag, &["name", "label"]) {
                tokens.push(name.to_lowercase());
            }
        }
    }

    // (b) objects: "label" or {object|name}
    if let Some(objects) = vision.get("objects").and_then(Value::as_array) {
        for object in objects {
            if let Some(name) = entry_name(object, &["object", "name"]) {
                tokens.push(name.to_lowercase());
            }
        }
    }

    // (c) caption / description words
    for key in ["caption", "description"] {
        if let Some(text) = vision.get(key).and_then(caption_text) {
            tokens.extend(text.split_whitespace().map(str::to_lowercase));
        }
    }

    tokens
}

fn entry_name<'a>(entry: &'a Value, keys: &[&str]) -> Option<&'a str> {
    let name = match entry {
        Value::String(s) => Some(s.as_str()),
        Value::Object(map) => keys.iter().find_map(|k| map.get(*k).and_then(Value::as_str)),
        _ => None,
    }?;
    let name = name.trim();
    (!name.is_empty()).then_some(name)
}

// Plain string, or `{text}` as some vision providers nest it
fn caption_text(value: &Value) -> Option<&str> {
    match value {
        Value::String(s) => Some(s.as_str()),
        Value::Object(map) => map.get("text").and_then(Value::as_str),
        _ => None,
    }
}
