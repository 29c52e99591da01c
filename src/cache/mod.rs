//! Parsed-config cache
//!
//! A loader can be handed a cache so repeated registrations of the same file
//! skip the read and parse. The cache stores the raw tree, before placeholder
//! harvesting, so replacements still apply on every registration.

use crate::domain::ConfigTree;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

pub trait ConfigCache: Send + Sync {
    fn get(&self, key: &str) -> Option<ConfigTree>;
    fn set(&self, key: &str, tree: ConfigTree);
}

/// Process-local cache keyed by filename.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, ConfigTree>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn invalidate(&self, key: &str) -> bool {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).remove(key).is_some()
    }

    pub fn clear(&self) {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

impl ConfigCache for MemoryCache {
    fn get(&self, key: &str) -> Option<ConfigTree> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).get(key).cloned()
    }

    fn set(&self, key: &str, tree: ConfigTree) {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).insert(key.to_string(), tree);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn stores_and_returns_trees() {
        let cache = MemoryCache::new();
        assert!(cache.get("config.json").is_none());

        cache.set("config.json", json!({"debug": true}));
        assert_eq!(cache.get("config.json"), Some(json!({"debug": true})));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn invalidate_and_clear() {
        let cache = MemoryCache::new();
        cache.set("a.yml", json!({}));
        cache.set("b.yml", json!({}));

        assert!(cache.invalidate("a.yml"));
        assert!(!cache.invalidate("a.yml"));
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }
}
