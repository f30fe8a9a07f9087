//! Feature Set - deduplicated lowercase tokens for one report.

use std::collections::BTreeSet;

/// Token collection derived from one report.
///
/// Tokens are lowercase and unique; `text` is the space-joined view used for
/// substring matching.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureSet {
    tokens: BTreeSet<String>,
    text: String,
    /// Raw image size in bytes, when known
    pub image_size: Option<u64>,
    /// True when at least one token came from vision analysis
    pub has_vision: bool,
}

impl FeatureSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from arbitrary tokens (lowercased, empty entries skipped)
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::new();
        set.extend(tokens);
        set
    }

    pub fn with_image_size(mut self, bytes: u64) -> Self {
        self.image_size = Some(bytes);
        self
    }

    /// Insert one token. Returns false if it was empty or already present.
    pub fn insert(&mut self, token: &str) -> bool {
        let token = token.trim().to_lowercase();
        if token.is_empty() {
            return false;
        }
        let inserted = self.tokens.insert(token);
        if inserted {
            self.rebuild_text();
        }
        inserted
    }

    pub fn extend<I, S>(&mut self, tokens: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut changed = false;
        for token in tokens {
            let token = token.as_ref().trim().to_lowercase();
            if !token.is_empty() {
                changed |= self.tokens.insert(token);
            }
        }
        if changed {
            self.rebuild_text();
        }
    }

    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(String::as_str)
    }

    /// Combined text all keyword matching runs against
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Substring containment against the combined text (needle lowercased)
    pub fn contains(&self, needle: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        !needle.is_empty() && self.text.contains(&needle)
    }

    /// True if any single token contains `needle` (case-insensitive)
    pub fn any_token_contains(&self, needle: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        !needle.is_empty() && self.tokens.iter().any(|t| t.contains(&needle))
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    fn rebuild_text(&mut self) {
        self.text = self.tokens.iter().map(String::as_str).collect::<Vec<_>>().join(" ");
    }
}
