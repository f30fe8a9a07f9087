//! Features Module - Feature Extraction Engine
//!
//! Normalizes raw vision output and free-text report fields into one flat,
//! lowercase token set. Matching downstream is plain substring containment,
//! so every decision can be explained as "text contains token X".

pub mod set;
pub mod extract;

#[cfg(test)]
mod tests;

pub use set::FeatureSet;
pub use extract::{extract_features, vision_tokens, ReportInput};
