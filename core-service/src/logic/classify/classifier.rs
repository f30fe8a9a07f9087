//! Base Classifier
//!
//! Classify logic only - no types, no tables.
//! Input: FeatureSet + ScoringTable
//! Output: ClassificationResult
//!
//! Order of precedence:
//! 1. Collision token → `accident` at a fixed confidence
//! 2. Nothing above the activation threshold → large-image or `other` default
//! 3. Flood/accident leader → water vs. crash indicator disambiguation
//! 4. Otherwise the highest score, ties broken by the table's policy

use crate::logic::features::FeatureSet;

use super::rules::{CategoryRule, ImageSizeBand, ScoringTable, TieBreak};
use super::types::{clamp_unit, CategoryScores, ClassificationResult, DecisionSource, EmergencyType};

// ============================================================================
// SCORING
// ============================================================================

/// Evidence gathered for one category
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryMatch {
    pub category: EmergencyType,
    pub keywords: Vec<String>,
    pub image_bonus: f32,
    pub urgency_bonus: f32,
    pub score: f32,
}

/// Raw scores plus the evidence behind them
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreSheet {
    pub scores: CategoryScores,
    pub matches: Vec<CategoryMatch>,
    pub urgency_words: Vec<String>,
}

impl ScoreSheet {
    /// Human-readable evidence lines, one per category that scored
    pub fn describe(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for m in self.matches.iter().filter(|m| m.score > 0.0) {
            let mut line = format!("{}: score {:.2}", m.category, m.score);
            if !m.keywords.is_empty() {
                line.push_str(&format!(" [keywords: {}]", m.keywords.join(", ")));
            }
            if m.image_bonus > 0.0 {
                line.push_str(&format!(" [image size +{:.2}]", m.image_bonus));
            }
            if m.urgency_bonus > 0.0 {
                line.push_str(&format!(" [urgency +{:.2}]", m.urgency_bonus));
            }
            lines.push(line);
        }
        if !self.urgency_words.is_empty() {
            lines.push(format!("Urgency wording: {}", self.urgency_words.join(", ")));
        }
        lines
    }
}

/// Compute the per-category raw scores, each clamped to ≤ 1.0
pub fn score_features(features: &FeatureSet, table: &ScoringTable) -> ScoreSheet {
    let text = features.text();
    let mut sheet = ScoreSheet {
        urgency_words: table
            .urgency_words
            .iter()
            .filter(|w| !w.is_empty() && text.contains(w.as_str()))
            .cloned()
            .collect(),
        ..Default::default()
    };

    for rule in &table.categories {
        let keywords: Vec<String> = rule
            .keywords
            .iter()
            .filter(|k| !k.is_empty() && text.contains(k.as_str()))
            .cloned()
            .collect();

        // Image size only speaks when there is no richer vision output
        let image_bonus = if features.has_vision {
            0.0
        } else {
            band_bonus(&rule.image_bands, features.image_size)
        };

        let urgency_bonus = if !keywords.is_empty() && !sheet.urgency_words.is_empty() {
            table.urgency_bonus
        } else {
            0.0
        };

        let raw = keywords.len() as f32 * rule.weight + image_bonus + urgency_bonus;
        let score = clamp_unit(raw);
        sheet.scores.set(rule.category, score);
        sheet.matches.push(CategoryMatch {
            category: rule.category,
            keywords,
            image_bonus,
            urgency_bonus,
            score,
        });
    }

    sheet
}

fn band_bonus(bands: &[ImageSizeBand], image_size: Option<u64>) -> f32 {
    let Some(size) = image_size else {
        return 0.0;
    };
    bands
        .iter()
        .filter(|b| size >= b.min_bytes)
        .map(|b| b.bonus)
        .fold(0.0, f32::max)
}

/// Highest-scoring category with the table's tie-break applied
pub fn leading_category(scores: &CategoryScores, table: &ScoringTable) -> Option<(EmergencyType, f32)> {
    let mut best: Option<(&CategoryRule, f32)> = None;

    for rule in &table.categories {
        let score = scores.get(rule.category);
        best = match best {
            None => Some((rule, score)),
            Some((_, best_score)) if score > best_score => Some((rule, score)),
            Some((current, best_score))
                if score == best_score
                    && table.tie_break == TieBreak::Priority
                    && rule.priority < current.priority =>
            {
                Some((rule, score))
            }
            keep => keep,
        };
    }

    let best = best.map(|(rule, score)| (rule.category, score));

    // `other` has no keywords of its own; it sits last in every tie order,
    // so it only leads once adjustments push it strictly ahead
    let other = scores.get(EmergencyType::Other);
    match best {
        Some((_, score)) if other <= score => best,
        _ => Some((EmergencyType::Other, other)),
    }
}

// ============================================================================
// DECISION
// ============================================================================

/// Classify with the base scorer only
pub fn classify(features: &FeatureSet, table: &ScoringTable) -> ClassificationResult {
    let sheet = score_features(features, table);
    decide(features, &sheet, &sheet.scores, table)
}

/// Final pick over `scores` (raw or rule-adjusted); `sheet` supplies evidence
pub fn decide(
    features: &FeatureSet,
    sheet: &ScoreSheet,
    scores: &CategoryScores,
    table: &ScoringTable,
) -> ClassificationResult {
    let thresholds = &table.thresholds;
    let text = features.text();
    let mut details = sheet.describe();

    if let Some(token) = table.overrides.collision_token_in(text) {
        details.push(format!("Collision override: '{}' forces accident", token));
        return ClassificationResult::new(
            EmergencyType::Accident,
            thresholds.collision_confidence,
            DecisionSource::CollisionOverride,
            *scores,
            details,
        );
    }

    let leader = leading_category(scores, table).filter(|(_, score)| *score > thresholds.activation);

    let Some((leader, leader_score)) = leader else {
        let large = features
            .image_size
            .is_some_and(|size| size >= thresholds.large_image_bytes);
        if large {
            details.push(format!(
                "No category above {:.2}; large image defaults to flood",
                thresholds.activation
            ));
            return ClassificationResult::new(
                EmergencyType::Flood,
                thresholds.large_image_confidence,
                DecisionSource::LargeImageDefault,
                *scores,
                details,
            );
        }
        details.push(format!("No category above {:.2}", thresholds.activation));
        return ClassificationResult::new(
            EmergencyType::Other,
            thresholds.fallback_confidence,
            DecisionSource::Fallback,
            *scores,
            details,
        );
    };

    if matches!(leader, EmergencyType::Flood | EmergencyType::Accident) {
        let water = table.overrides.water_count(text);
        let crash = table.overrides.crash_count(text);
        let winner = if water > crash && water > 0 {
            Some(EmergencyType::Flood)
        } else if crash > water && crash > 0 {
            Some(EmergencyType::Accident)
        } else {
            None
        };

        if let Some(winner) = winner {
            details.push(format!(
                "Disambiguation: {} water vs {} crash indicator(s) → {}",
                water, crash, winner
            ));
            let confidence = (scores.get(winner) + thresholds.disambiguation_boost).min(1.0);
            return ClassificationResult::new(
                winner,
                confidence,
                DecisionSource::Disambiguation,
                *scores,
                details,
            );
        }
    }

    details.push(format!("Selected {} (score {:.2})", leader, leader_score));
    ClassificationResult::new(leader, leader_score, DecisionSource::Score, *scores, details)
}

// ============================================================================
// TESTS
// ============================================================================
