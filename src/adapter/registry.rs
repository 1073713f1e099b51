//! Adapter registry
//!
//! Resolves the `plugin` identifier of a descriptor to a shared adapter
//! instance. Pre-populated with the built-in backends; embedding code can
//! register additional adapters before a run.

use super::builtin::{BuiltinAdapter, Normalizer, PeekKind};
use super::Adapter;
use crate::error::{Error, Result};
use std::collections::HashMap;
use std::sync::Arc;

/// Named adapter lookup
pub struct AdapterRegistry {
    adapters: HashMap<String, Arc<dyn Adapter>>,
}

impl AdapterRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            adapters: HashMap::new(),
        }
    }

    /// Create a registry holding the built-in backends:
    ///
    /// - `json` - JSON responses, plain peek
    /// - `json-regex` - JSON responses, regex peek (Link-header style)
    /// - `json-calculated` - JSON responses, calculated page arithmetic
    /// - `xml` - XML responses converted to JSON, plain peek
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(
            "json",
            Arc::new(BuiltinAdapter::new(Normalizer::Json, PeekKind::Default)),
        );
        registry.register(
            "json-regex",
            Arc::new(BuiltinAdapter::new(Normalizer::Json, PeekKind::Regex)),
        );
        registry.register(
            "json-calculated",
            Arc::new(BuiltinAdapter::new(Normalizer::Json, PeekKind::Calculated)),
        );
        registry.register(
            "xml",
            Arc::new(BuiltinAdapter::new(Normalizer::Xml, PeekKind::Default)),
        );
        registry
    }

    /// Register an adapter under a plugin identifier, replacing any
    /// previous binding.
    pub fn register(&mut self, plugin: impl Into<String>, adapter: Arc<dyn Adapter>) {
        self.adapters.insert(plugin.into(), adapter);
    }

    /// Resolve a plugin identifier.
    pub fn resolve(&self, plugin: &str) -> Result<Arc<dyn Adapter>> {
        self.adapters
            .get(plugin)
            .cloned()
            .ok_or_else(|| Error::UnknownAdapter {
                plugin: plugin.to_string(),
            })
    }

    /// Registered plugin identifiers, sorted.
    pub fn plugins(&self) -> Vec<String> {
        let mut names: Vec<String> = self.adapters.keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl std::fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterRegistry")
            .field("plugins", &self.plugins())
            .finish()
    }
}
