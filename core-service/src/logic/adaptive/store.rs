//! Adaptive Rule Store
//!
//! The store exclusively owns the authoritative rule set. Classification only
//! ever reads a snapshot; the learning job is the only writer.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::types::AdaptiveRule;
use crate::constants::{APP_DIR_NAME, RULE_STORE_FILE};

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug)]
pub enum StoreError {
    IoError(std::io::Error),
    SerializationError(serde_json::Error),
    NotFound(String),
    Duplicate(String),
    /// Optimistic concurrency check failed
    VersionConflict {
        name: String,
        expected: u32,
        actual: u32,
    },
    /// Backend unreachable or rejected the call
    Unavailable(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::IoError(e) => write!(f, "IO Error: {}", e),
            StoreError::SerializationError(e) => write!(f, "Serialization Error: {}", e),
            StoreError::NotFound(what) => write!(f, "Not found: {}", what),
            StoreError::Duplicate(name) => write!(f, "Rule '{}' already exists", name),
            StoreError::VersionConflict { name, expected, actual } => write!(
                f,
                "Version conflict on rule '{}': expected v{}, found v{}",
                name, expected, actual
            ),
            StoreError::Unavailable(msg) => write!(f, "Store unavailable: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::IoError(err)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::SerializationError(err)
    }
}

// ============================================================================
// STORE TRAIT
// ============================================================================

/// Keyed collection of adaptive rules
pub trait RuleStore: Send + Sync {
    fn find_by_name(&self, name: &str) -> Result<Option<AdaptiveRule>, StoreError>;

    /// All active rules, most-proven (highest learned count) first
    fn load_active_rules(&self) -> Result<Vec<AdaptiveRule>, StoreError>;

    /// Insert a new rule. Fails with `Duplicate` if the name is taken.
    fn insert(&self, rule: AdaptiveRule) -> Result<AdaptiveRule, StoreError>;

    /// Replace the rule with the same id, only if the stored version is
    /// still `expected_version`.
    fn update(&self, rule: AdaptiveRule, expected_version: u32) -> Result<AdaptiveRule, StoreError>;

    /// Manual activation toggle
    fn set_active(&self, id: Uuid, active: bool) -> Result<AdaptiveRule, StoreError>;
}

/// Application order: learned count descending, then name
pub fn sort_for_application(rules: &mut [AdaptiveRule]) {
    rules.sort_by(|a, b| {
        b.learned_from_corrections_count
            .cmp(&a.learned_from_corrections_count)
            .then_with(|| a.name.cmp(&b.name))
    });
}

type RuleMap = HashMap<Uuid, AdaptiveRule>;

fn find_in(map: &RuleMap, name: &str) -> Option<AdaptiveRule> {
    map.values().find(|r| r.name == name).cloned()
}

fn active_in(map: &RuleMap) -> Vec<AdaptiveRule> {
    let mut rules: Vec<AdaptiveRule> = map.values().filter(|r| r.is_active).cloned().collect();
    sort_for_application(&mut rules);
    rules
}

fn insert_into(map: &mut RuleMap, rule: AdaptiveRule) -> Result<AdaptiveRule, StoreError> {
    if map.values().any(|r| r.name == rule.name) {
        return Err(StoreError::Duplicate(rule.name));
    }
    map.insert(rule.id, rule.clone());
    Ok(rule)
}

fn update_in(map: &mut RuleMap, rule: AdaptiveRule, expected_version: u32) -> Result<AdaptiveRule, StoreError> {
    let stored = map
        .get(&rule.id)
        .ok_or_else(|| StoreError::NotFound(format!("rule {}", rule.id)))?;

    if stored.version != expected_version {
        return Err(StoreError::VersionConflict {
            name: stored.name.clone(),
            expected: expected_version,
            actual: stored.version,
        });
    }
    if map.values().any(|r| r.id != rule.id && r.name == rule.name) {
        return Err(StoreError::Duplicate(rule.name));
    }

    map.insert(rule.id, rule.clone());
    Ok(rule)
}

fn set_active_in(map: &mut RuleMap, id: Uuid, active: bool) -> Result<AdaptiveRule, StoreError> {
    let rule = map
        .get_mut(&id)
        .ok_or_else(|| StoreError::NotFound(format!("rule {}", id)))?;
    rule.is_active = active;
    rule.updated_at = Utc::now();
    Ok(rule.clone())
}

// ============================================================================
// IN-MEMORY STORE
// ============================================================================

#[derive(Default)]
pub struct MemoryRuleStore {
    rules: RwLock<RuleMap>,
}

impl MemoryRuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(rules: Vec<AdaptiveRule>) -> Self {
        Self {
            rules: RwLock::new(rules.into_iter().map(|r| (r.id, r)).collect()),
        }
    }

    pub fn len(&self) -> usize {
        self.rules.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.read().is_empty()
    }
}

impl RuleStore for MemoryRuleStore {
    fn find_by_name(&self, name: &str) -> Result<Option<AdaptiveRule>, StoreError> {
        Ok(find_in(&self.rules.read(), name))
    }

    fn load_active_rules(&self) -> Result<Vec<AdaptiveRule>, StoreError> {
        Ok(active_in(&self.rules.read()))
    }

    fn insert(&self, rule: AdaptiveRule) -> Result<AdaptiveRule, StoreError> {
        insert_into(&mut self.rules.write(), rule)
    }

    fn update(&self, rule: AdaptiveRule, expected_version: u32) -> Result<AdaptiveRule, StoreError> {
        update_in(&mut self.rules.write(), rule, expected_version)
    }

    fn set_active(&self, id: Uuid, active: bool) -> Result<AdaptiveRule, StoreError> {
        set_active_in(&mut self.rules.write(), id, active)
    }
}

// ============================================================================
// JSON FILE STORE
// ============================================================================

const FILE_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct RuleFile {
    format_version: u32,
    rules: Vec<AdaptiveRule>,
}

/// Rule store persisted as a single JSON document.
///
/// Every write goes to disk before the in-memory copy is replaced, so a
/// failed write leaves both unchanged.
pub struct FileRuleStore {
    path: PathBuf,
    rules: RwLock<RuleMap>,
}

impl FileRuleStore {
    /// Default location under the platform data directory
    pub fn default_path() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR_NAME)
            .join(RULE_STORE_FILE)
    }

    /// Open (or start) a store at `path`; a missing file is an empty store
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let rules = if path.exists() {
            let data = fs::read(&path)?;
            let file: RuleFile = serde_json::from_slice(&data)?;
            if file.format_version != FILE_FORMAT_VERSION {
                return Err(StoreError::Unavailable(format!(
                    "unsupported rule file format v{}",
                    file.format_version
                )));
            }
            file.rules.into_iter().map(|r| (r.id, r)).collect()
        } else {
            RuleMap::new()
        };

        log::debug!("Rule store opened at {} ({} rules)", path.display(), rules.len());
        Ok(Self {
            path,
            rules: RwLock::new(rules),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, map: &RuleMap) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut rules: Vec<AdaptiveRule> = map.values().cloned().collect();
        rules.sort_by(|a, b| a.name.cmp(&b.name));

        let json = serde_json::to_vec_pretty(&RuleFile {
            format_version: FILE_FORMAT_VERSION,
            rules,
        })?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    fn mutate<F>(&self, op: F) -> Result<AdaptiveRule, StoreError>
    where
        F: FnOnce(&mut RuleMap) -> Result<AdaptiveRule, StoreError>,
    {
        let mut guard = self.rules.write();
        let mut next = guard.clone();
        let rule = op(&mut next)?;
        self.persist(&next)?;
        *guard = next;
        Ok(rule)
    }
}

impl RuleStore for FileRuleStore {
    fn find_by_name(&self, name: &str) -> Result<Option<AdaptiveRule>, StoreError> {
        Ok(find_in(&self.rules.read(), name))
    }

    fn load_active_rules(&self) -> Result<Vec<AdaptiveRule>, StoreError> {
        Ok(active_in(&self.rules.read()))
    }

    fn insert(&self, rule: AdaptiveRule) -> Result<AdaptiveRule, StoreError> {
        self.mutate(|map| insert_into(map, rule))
    }

    fn update(&self, rule: AdaptiveRule, expected_version: u32) -> Result<AdaptiveRule, StoreError> {
        self.mutate(|map| update_in(map, rule, expected_version))
    }

    fn set_active(&self, id: Uuid, active: bool) -> Result<AdaptiveRule, StoreError> {
        self.mutate(|map| set_active_in(map, id, active))
    }
}
