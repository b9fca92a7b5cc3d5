//! Model registry and fallback order.
//!
//! Both structures are built once at startup and injected into the
//! dispatcher; they are never mutated afterwards, so handlers may share them
//! behind an `Arc` without synchronization.

use std::collections::HashMap;

use crate::error::RelayError;

/// Immutable mapping from caller-facing model key to the fully-qualified
/// model identifier the upstream API expects.
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    by_key: HashMap<String, String>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a model key with its upstream identifier.
    pub fn register(&mut self, key: impl Into<String>, upstream_id: impl Into<String>) {
        self.by_key.insert(key.into(), upstream_id.into());
    }

    /// Resolve a key to the upstream model identifier.
    pub fn resolve(&self, key: &str) -> Option<&str> {
        self.by_key.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.by_key.contains_key(key)
    }

    /// Registered keys, sorted for stable listings.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.by_key.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// Built-in model table: the short keys the demo page offers, mapped to
    /// OpenRouter model identifiers.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("gpt", "openai/gpt-4o-mini");
        registry.register("claude", "anthropic/claude-3.5-haiku");
        registry.register("gemini", "google/gemini-2.0-flash-001");
        registry.register("llama", "meta-llama/llama-3.3-70b-instruct");
        registry
    }
}

/// Ordered priority list of model keys tried after the requested model fails.
#[derive(Debug, Clone)]
pub struct FallbackOrder {
    keys: Vec<String>,
}

impl FallbackOrder {
    /// Build a fallback order. Every key must exist in the registry; order is
    /// significant and preserved.
    pub fn new(keys: Vec<String>, registry: &ModelRegistry) -> Result<Self, RelayError> {
        for key in &keys {
            if !registry.contains(key) {
                return Err(RelayError::Configuration(format!(
                    "fallback order references unknown model key '{key}'"
                )));
            }
        }
        Ok(Self { keys })
    }

    /// Default priority order over the built-in model table.
    pub fn with_defaults(registry: &ModelRegistry) -> Result<Self, RelayError> {
        Self::new(
            ["gpt", "claude", "gemini", "llama"]
                .into_iter()
                .map(String::from)
                .collect(),
            registry,
        )
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Candidate keys to try after `requested` has failed, in priority order.
    /// The requested key and any duplicate entries are removed so no model is
    /// ever attempted twice within one request.
    pub fn candidates_after(&self, requested: &str) -> Vec<&str> {
        let mut seen = vec![requested];
        let mut candidates = Vec::new();
        for key in &self.keys {
            if seen.contains(&key.as_str()) {
                continue;
            }
            seen.push(key);
            candidates.push(key.as_str());
        }
        candidates
    }
}
