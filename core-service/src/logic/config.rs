use std::sync::atomic::{AtomicBool, Ordering};

// Kill-switches for the adaptive loop. Default state: enabled.
static ADAPTIVE_RULES: AtomicBool = AtomicBool::new(true);
static LEARNING: AtomicBool = AtomicBool::new(true);

pub struct SafetyConfig;

impl SafetyConfig {
    /// Whether stored rules are consulted at classification time
    pub fn is_adaptive_rules_enabled() -> bool {
        ADAPTIVE_RULES.load(Ordering::Relaxed)
    }

    /// Whether the learning job may write to the rule store
    pub fn is_learning_enabled() -> bool {
        LEARNING.load(Ordering::Relaxed)
    }

    pub fn set_adaptive_rules(val: bool) { ADAPTIVE_RULES.store(val, Ordering::Relaxed); }
    pub fn set_learning(val: bool) { LEARNING.store(val, Ordering::Relaxed); }
}
