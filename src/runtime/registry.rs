//! Host-side entry registry.
//!
//! Entries registered here are visible to every execution context as a
//! fallback behind the isolated load path. This is how launcher-owned
//! built-ins are shared with launched components without putting them on
//! the load path itself.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::runtime::abi::EntryPoint;

/// Registry of host entry points, keyed by entry type name.
#[derive(Clone, Default)]
pub struct EntryRegistry {
    entries: Arc<RwLock<HashMap<String, Vec<EntryPoint>>>>,
}

impl EntryRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entry point under its type name.
    pub fn register(&self, entry: EntryPoint) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries
            .entry(entry.type_name.clone())
            .or_default()
            .push(entry);
    }

    /// All entries of a type, cloned out of the registry.
    pub fn lookup_type(&self, type_name: &str) -> Option<Vec<EntryPoint>> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.get(type_name).cloned()
    }

    /// Check whether any entry of the given type is registered.
    pub fn contains_type(&self, type_name: &str) -> bool {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.contains_key(type_name)
    }

    /// List all registered type names.
    pub fn list_types(&self) -> Vec<String> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_args: &[String]) {}

    #[test]
    fn test_register_and_lookup() {
        let registry = EntryRegistry::new();
        assert!(!registry.contains_type("host.Tool"));

        registry.register(EntryPoint::new("host.Tool", "main", noop));
        registry.register(EntryPoint::new("host.Tool", "alternate", noop));

        let entries = registry.lookup_type("host.Tool").unwrap();
        assert_eq!(entries.len(), 2);
        assert!(registry.contains_type("host.Tool"));
        assert_eq!(registry.list_types(), vec!["host.Tool".to_string()]);
        assert!(registry.lookup_type("host.Other").is_none());
    }
}
