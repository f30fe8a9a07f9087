//! Central Configuration Constants
//!
//! Single source of truth for defaults that callers may override from the
//! environment.

use crate::logic::classify::KeywordProfile;

/// Default keyword profile when none is configured
pub const DEFAULT_KEYWORD_PROFILE: KeywordProfile = KeywordProfile::Philippine;

/// File name of the JSON rule store
pub const RULE_STORE_FILE: &str = "adaptive_rules.json";

/// App data directory name
pub const APP_DIR_NAME: &str = "emergency-triage";

/// Crate version
pub const CORE_VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================
// Helper functions to read from env with fallback
// ============================================

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|s| s.to_lowercase() != "false" && s != "0")
        .unwrap_or(true)
}

/// Check if adaptive rules should be applied at classification time
pub fn is_adaptive_rules_enabled() -> bool {
    env_flag("ADAPTIVE_RULES_ENABLED")
}

/// Check if learning runs may write rules
pub fn is_learning_enabled() -> bool {
    env_flag("LEARNING_ENABLED")
}
