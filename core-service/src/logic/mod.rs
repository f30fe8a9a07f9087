//! Logic Module - Classification & Learning Engines
//!
//! - `features/` - Feature extraction (vision output + report text → tokens)
//! - `classify/` - Keyword-weighted base classifier with overrides
//! - `adaptive/` - Adaptive rule types, stores and the rule applier
//! - `learning/` - Correction analysis and rule learning
//! - `pipeline` - Classification entry point wiring the pieces together

pub mod config;
pub mod features;
pub mod classify;
pub mod adaptive;
pub mod learning;
pub mod pipeline;
