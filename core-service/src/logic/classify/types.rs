//! Classification Types
//!
//! Core types for emergency classification.
//! No logic here - data structures only.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ============================================================================
// EMERGENCY TYPE
// ============================================================================

/// Closed set of emergency categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmergencyType {
    Flood,
    Fire,
    Accident,
    Medical,
    Other,
}

impl EmergencyType {
    pub const ALL: [EmergencyType; 5] = [
        EmergencyType::Flood,
        EmergencyType::Fire,
        EmergencyType::Accident,
        EmergencyType::Medical,
        EmergencyType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EmergencyType::Flood => "flood",
            EmergencyType::Fire => "fire",
            EmergencyType::Accident => "accident",
            EmergencyType::Medical => "medical",
            EmergencyType::Other => "other",
        }
    }

    fn index(&self) -> usize {
        match self {
            EmergencyType::Flood => 0,
            EmergencyType::Fire => 1,
            EmergencyType::Accident => 2,
            EmergencyType::Medical => 3,
            EmergencyType::Other => 4,
        }
    }
}

impl FromStr for EmergencyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "flood" => Ok(EmergencyType::Flood),
            "fire" => Ok(EmergencyType::Fire),
            "accident" => Ok(EmergencyType::Accident),
            "medical" => Ok(EmergencyType::Medical),
            "other" => Ok(EmergencyType::Other),
            other => Err(format!("unknown emergency type '{}'", other)),
        }
    }
}

impl std::fmt::Display for EmergencyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// CATEGORY SCORES
// ============================================================================

/// Per-category score table, every entry kept within [0, 1]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<EmergencyType, f32>", into = "BTreeMap<EmergencyType, f32>")]
pub struct CategoryScores([f32; 5]);

impl CategoryScores {
    pub fn get(&self, category: EmergencyType) -> f32 {
        self.0[category.index()]
    }

    pub fn set(&mut self, category: EmergencyType, score: f32) {
        self.0[category.index()] = clamp_unit(score);
    }

    /// Add a (possibly negative) delta, clamping the result into [0, 1]
    pub fn add(&mut self, category: EmergencyType, delta: f32) {
        let current = self.get(category);
        self.set(category, current + delta);
    }

    pub fn iter(&self) -> impl Iterator<Item = (EmergencyType, f32)> + '_ {
        EmergencyType::ALL.iter().map(move |t| (*t, self.get(*t)))
    }
}

impl From<BTreeMap<EmergencyType, f32>> for CategoryScores {
    fn from(map: BTreeMap<EmergencyType, f32>) -> Self {
        let mut scores = CategoryScores::default();
        for (category, score) in map {
            scores.set(category, score);
        }
        scores
    }
}

impl From<CategoryScores> for BTreeMap<EmergencyType, f32> {
    fn from(scores: CategoryScores) -> Self {
        scores.iter().collect()
    }
}

/// Clamp into [0, 1]; NaN collapses to 0
pub fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

// ============================================================================
// CLASSIFICATION RESULT
// ============================================================================

/// Which step of the algorithm produced the final type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionSource {
    /// Highest score after tie-break
    Score,
    /// Collision token forced `accident`
    CollisionOverride,
    /// Water vs. crash indicator count decided flood/accident
    Disambiguation,
    /// Nothing above threshold, large image → flood
    LargeImageDefault,
    /// Nothing above threshold → other
    Fallback,
}

/// Result of classifying one report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    #[serde(rename = "type")]
    pub emergency_type: EmergencyType,
    pub confidence: f32,
    pub details: Vec<String>,
    pub analysis: String,
    pub decided_by: DecisionSource,
    /// Final per-category scores (after adaptive rules)
    pub scores: CategoryScores,
    /// Names of adaptive rules that fired
    #[serde(default)]
    pub applied_rules: Vec<String>,
}

impl ClassificationResult {
    pub fn new(
        emergency_type: EmergencyType,
        confidence: f32,
        decided_by: DecisionSource,
        scores: CategoryScores,
        details: Vec<String>,
    ) -> Self {
        let confidence = clamp_unit(confidence);
        Self {
            emergency_type,
            confidence,
            analysis: describe(emergency_type, confidence, decided_by),
            details,
            decided_by,
            scores,
            applied_rules: Vec::new(),
        }
    }
}

fn describe(emergency_type: EmergencyType, confidence: f32, decided_by: DecisionSource) -> String {
    let pct = (confidence * 100.0).round();
    match decided_by {
        DecisionSource::Score => format!(
            "Detected {} emergency ({}% confidence) from keyword evidence",
            emergency_type, pct
        ),
        DecisionSource::CollisionOverride => format!(
            "Detected vehicle collision ({}% confidence) from collision wording",
            pct
        ),
        DecisionSource::Disambiguation => format!(
            "Detected {} emergency ({}% confidence); water vs. crash indicators resolved the scene",
            emergency_type, pct
        ),
        DecisionSource::LargeImageDefault => format!(
            "No strong indicators; large photo defaults to {} ({}% confidence)",
            emergency_type, pct
        ),
        DecisionSource::Fallback => format!(
            "No strong emergency indicators detected ({}% confidence)",
            pct
        ),
    }
}
