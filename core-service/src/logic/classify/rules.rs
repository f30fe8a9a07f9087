//! Classification Rules & Scoring Tables
//!
//! Declarative keyword tables, override token lists and thresholds.
//! No classify logic here - only constants and config.

use std::str::FromStr;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use super::types::EmergencyType;

// ============================================================================
// THRESHOLDS (Constants)
// ============================================================================

/// A category must score strictly above this to be picked
pub const ACTIVATION_THRESHOLD: f32 = 0.3;

/// Fixed confidence for the collision-token override
pub const COLLISION_CONFIDENCE: f32 = 0.95;

/// Confidence bump for the winner of the flood/accident disambiguation
pub const DISAMBIGUATION_BOOST: f32 = 0.1;

/// Images at or above this size count as "substantial" photos
pub const LARGE_IMAGE_BYTES: u64 = 1024 * 1024;

/// Medium image band
pub const MEDIUM_IMAGE_BYTES: u64 = 300 * 1024;

/// Default confidence when a large image carries no other signal
pub const LARGE_IMAGE_CONFIDENCE: f32 = 0.75;

/// Default confidence for `other`
pub const FALLBACK_CONFIDENCE: f32 = 0.70;

/// Bonus added to every category with at least one keyword hit when the
/// report contains urgency wording
pub const URGENCY_BONUS: f32 = 0.05;

// ============================================================================
// CONFIGURABLE THRESHOLDS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierThresholds {
    pub activation: f32,
    pub collision_confidence: f32,
    pub disambiguation_boost: f32,
    pub large_image_bytes: u64,
    pub large_image_confidence: f32,
    pub fallback_confidence: f32,
}

impl Default for ClassifierThresholds {
    fn default() -> Self {
        Self {
            activation: ACTIVATION_THRESHOLD,
            collision_confidence: COLLISION_CONFIDENCE,
            disambiguation_boost: DISAMBIGUATION_BOOST,
            large_image_bytes: LARGE_IMAGE_BYTES,
            large_image_confidence: LARGE_IMAGE_CONFIDENCE,
            fallback_confidence: FALLBACK_CONFIDENCE,
        }
    }
}

// ============================================================================
// SCORING TABLE
// ============================================================================

/// Fixed bonus for images at or above `min_bytes`.
///
/// Only consulted when the report has no vision tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageSizeBand {
    pub min_bytes: u64,
    pub bonus: f32,
}

/// One row of the scoring table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub category: EmergencyType,
    pub keywords: Vec<String>,
    /// Score per distinct keyword found
    pub weight: f32,
    /// Lower wins ties under `TieBreak::Priority`
    pub priority: u8,
    #[serde(default)]
    pub image_bands: Vec<ImageSizeBand>,
}

/// How equal top scores are resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// First category in table order wins
    TableOrder,
    /// Lowest `priority` wins
    Priority,
}

/// Hard-coded lexical exceptions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverrideTable {
    /// Any of these forces `accident`
    pub collision_tokens: Vec<String>,
    pub water_indicators: Vec<String>,
    pub crash_indicators: Vec<String>,
}

impl OverrideTable {
    /// First collision token contained in `text`
    pub fn collision_token_in(&self, text: &str) -> Option<&str> {
        self.collision_tokens
            .iter()
            .map(String::as_str)
            .find(|t| !t.is_empty() && text.contains(*t))
    }

    pub fn water_count(&self, text: &str) -> usize {
        count_present(&self.water_indicators, text)
    }

    pub fn crash_count(&self, text: &str) -> usize {
        count_present(&self.crash_indicators, text)
    }
}

/// Complete configuration for the base classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringTable {
    pub profile: KeywordProfile,
    pub categories: Vec<CategoryRule>,
    pub tie_break: TieBreak,
    pub urgency_words: Vec<String>,
    pub urgency_bonus: f32,
    pub overrides: OverrideTable,
    #[serde(default)]
    pub thresholds: ClassifierThresholds,
}

impl ScoringTable {
    /// Built-in table for a profile (constructed once per process)
    pub fn for_profile(profile: KeywordProfile) -> &'static ScoringTable {
        match profile {
            KeywordProfile::Generic => &GENERIC_TABLE,
            KeywordProfile::Philippine => &PHILIPPINE_TABLE,
        }
    }

    /// Parse a table from JSON and validate it
    pub fn from_json(json: &str) -> Result<Self, String> {
        let table: ScoringTable = serde_json::from_str(json).map_err(|e| e.to_string())?;
        table.validate()?;
        Ok(table)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.categories.is_empty() {
            return Err("scoring table has no categories".to_string());
        }
        let mut seen = Vec::new();
        for rule in &self.categories {
            if seen.contains(&rule.category) {
                return Err(format!("category '{}' listed twice", rule.category));
            }
            if rule.category == EmergencyType::Other {
                return Err("'other' is the fallback and cannot be scored".to_string());
            }
            if !(rule.weight > 0.0 && rule.weight <= 1.0) {
                return Err(format!("weight for '{}' must be in (0, 1]", rule.category));
            }
            seen.push(rule.category);
        }
        Ok(())
    }
}

fn count_present(words: &[String], text: &str) -> usize {
    words.iter().filter(|w| !w.is_empty() && text.contains(w.as_str())).count()
}

// ============================================================================
// PROFILES
// ============================================================================

/// Localized keyword set selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeywordProfile {
    Generic,
    Philippine,
}

impl KeywordProfile {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeywordProfile::Generic => "generic",
            KeywordProfile::Philippine => "philippine",
        }
    }
}

impl FromStr for KeywordProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "generic" => Ok(KeywordProfile::Generic),
            "philippine" | "ph" => Ok(KeywordProfile::Philippine),
            other => Err(format!("unknown keyword profile '{}'", other)),
        }
    }
}

static GENERIC_TABLE: Lazy<ScoringTable> = Lazy::new(generic_table);
static PHILIPPINE_TABLE: Lazy<ScoringTable> = Lazy::new(philippine_table);

const FLOOD_KEYWORDS: &[&str] = &[
    "flood", "flooded", "flooding", "water", "submerged", "inundated", "overflow", "rain", "river",
];
const FIRE_KEYWORDS: &[&str] = &[
    "fire", "smoke", "flame", "burning", "blaze", "burnt", "firefighter",
];
const ACCIDENT_KEYWORDS: &[&str] = &[
    "accident", "crash", "collision", "car", "vehicle", "truck", "motorcycle", "wreck", "traffic",
];
const MEDICAL_KEYWORDS: &[&str] = &[
    "injured", "injury", "blood", "ambulance", "hospital", "unconscious", "wound", "stretcher",
    "patient", "medical",
];
const URGENCY_WORDS: &[&str] = &["emergency", "urgent", "help", "rescue", "asap"];

const COLLISION_TOKENS: &[&str] = &["collission", "colission", "collison"];
const WATER_INDICATORS: &[&str] = &["water", "flood", "submerged", "rain", "river"];
const CRASH_INDICATORS: &[&str] = &["crash", "collision", "wreck", "accident"];

// Filipino / Taglish additions
const PH_FLOOD: &[&str] = &["baha", "bumabaha", "lubog", "tubig"];
const PH_FIRE: &[&str] = &["sunog", "nasusunog", "apoy", "usok"];
const PH_ACCIDENT: &[&str] = &["aksidente", "bangga", "sasakyan", "jeep", "tricycle"];
const PH_MEDICAL: &[&str] = &["sugatan", "dugo", "nahimatay", "ospital", "ambulansya"];
const PH_URGENCY: &[&str] = &["tulong", "saklolo"];
const PH_COLLISION: &[&str] = &["banggaan", "nagbanggaan", "nabangga"];
const PH_WATER: &[&str] = &["baha", "tubig"];
const PH_CRASH: &[&str] = &["aksidente", "bangga"];

fn words(lists: &[&[&str]]) -> Vec<String> {
    lists.iter().flat_map(|l| l.iter().map(|w| w.to_string())).collect()
}

fn flood_bands() -> Vec<ImageSizeBand> {
    vec![
        ImageSizeBand { min_bytes: LARGE_IMAGE_BYTES, bonus: 0.15 },
        ImageSizeBand { min_bytes: MEDIUM_IMAGE_BYTES, bonus: 0.05 },
    ]
}

fn generic_table() -> ScoringTable {
    ScoringTable {
        profile: KeywordProfile::Generic,
        categories: vec![
            CategoryRule {
                category: EmergencyType::Flood,
                keywords: words(&[FLOOD_KEYWORDS]),
                weight: 0.35,
                priority: 0,
                image_bands: flood_bands(),
            },
            CategoryRule {
                category: EmergencyType::Fire,
                keywords: words(&[FIRE_KEYWORDS]),
                weight: 0.4,
                priority: 1,
                image_bands: vec![],
            },
            CategoryRule {
                category: EmergencyType::Accident,
                keywords: words(&[ACCIDENT_KEYWORDS]),
                weight: 0.35,
                priority: 2,
                image_bands: vec![],
            },
            CategoryRule {
                category: EmergencyType::Medical,
                keywords: words(&[MEDICAL_KEYWORDS]),
                weight: 0.35,
                priority: 3,
                image_bands: vec![],
            },
        ],
        tie_break: TieBreak::TableOrder,
        urgency_words: words(&[URGENCY_WORDS]),
        urgency_bonus: URGENCY_BONUS,
        overrides: OverrideTable {
            collision_tokens: words(&[COLLISION_TOKENS]),
            water_indicators: words(&[WATER_INDICATORS]),
            crash_indicators: words(&[CRASH_INDICATORS]),
        },
        thresholds: ClassifierThresholds::default(),
    }
}

// fire > medical > flood > accident
fn philippine_table() -> ScoringTable {
    ScoringTable {
        profile: KeywordProfile::Philippine,
        categories: vec![
            CategoryRule {
                category: EmergencyType::Flood,
                keywords: words(&[FLOOD_KEYWORDS, PH_FLOOD]),
                weight: 0.35,
                priority: 2,
                image_bands: flood_bands(),
            },
            CategoryRule {
                category: EmergencyType::Fire,
                keywords: words(&[FIRE_KEYWORDS, PH_FIRE]),
                weight: 0.4,
                priority: 0,
                image_bands: vec![],
            },
            CategoryRule {
                category: EmergencyType::Accident,
                keywords: words(&[ACCIDENT_KEYWORDS, PH_ACCIDENT]),
                weight: 0.35,
                priority: 3,
                image_bands: vec![],
            },
            CategoryRule {
                category: EmergencyType::Medical,
                keywords: words(&[MEDICAL_KEYWORDS, PH_MEDICAL]),
                weight: 0.35,
                priority: 1,
                image_bands: vec![],
            },
        ],
        tie_break: TieBreak::Priority,
        urgency_words: words(&[URGENCY_WORDS, PH_URGENCY]),
        urgency_bonus: URGENCY_BONUS,
        overrides: OverrideTable {
            collision_tokens: words(&[COLLISION_TOKENS, PH_COLLISION]),
            water_indicators: words(&[WATER_INDICATORS, PH_WATER]),
            crash_indicators: words(&[CRASH_INDICATORS, PH_CRASH]),
        },
        thresholds: ClassifierThresholds::default(),
    }
}
