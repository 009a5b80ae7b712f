//! Process-wide runtime properties.
//!
//! Launched components and the host share a single string-to-string store,
//! the in-process analogue of system properties. The launcher applies
//! per-invocation overrides through [`PropertyGuard`] so that prior values
//! are restored on every path out of a run.

use std::collections::HashMap;

use dashmap::DashMap;
use lazy_static::lazy_static;

lazy_static! {
    static ref PROPERTIES: DashMap<String, String> = DashMap::new();
}

/// Look up a runtime property.
pub fn get(key: &str) -> Option<String> {
    PROPERTIES.get(key).map(|entry| entry.value().clone())
}

/// Set a runtime property, returning the previous value if any.
pub fn set(key: impl Into<String>, value: impl Into<String>) -> Option<String> {
    PROPERTIES.insert(key.into(), value.into())
}

/// Remove a runtime property, returning the previous value if any.
pub fn remove(key: &str) -> Option<String> {
    PROPERTIES.remove(key).map(|(_, value)| value)
}

/// Whether a property is currently set.
pub fn contains(key: &str) -> bool {
    PROPERTIES.contains_key(key)
}

/// Scoped application of property overrides.
///
/// Remembers the value each key had before the override and puts it back on
/// drop: overridden keys are restored, keys that did not exist are removed.
#[derive(Debug)]
pub struct PropertyGuard {
    prior: Vec<(String, Option<String>)>,
}

impl PropertyGuard {
    /// Apply `overrides` to the store, capturing the prior state.
    pub fn apply(overrides: &HashMap<String, String>) -> Self {
        let mut prior = Vec::with_capacity(overrides.len());
        for (key, value) in overrides {
            let previous = set(key.clone(), value.clone());
            prior.push((key.clone(), previous));
        }
        Self { prior }
    }
}

impl Drop for PropertyGuard {
    fn drop(&mut self) {
        for (key, previous) in self.prior.drain(..) {
            match previous {
                Some(value) => {
                    set(key, value);
                }
                None => {
                    remove(&key);
                }
            }
        }
    }
}
