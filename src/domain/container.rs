//! The key-value store config is merged into

use super::{ConfigMap, ConfigTree};

/// Minimal contract the merger needs from a dependency-injection container.
///
/// Implement this for your own container type; [`MemoryContainer`] covers the
/// common case of a plain map.
pub trait Container {
    fn has(&self, key: &str) -> bool;
    fn get(&self, key: &str) -> Option<&ConfigTree>;
    fn set(&mut self, key: &str, value: ConfigTree);
}

/// Insertion-ordered in-memory container.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryContainer {
    entries: ConfigMap,
}

impl MemoryContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn as_map(&self) -> &ConfigMap {
        &self.entries
    }

    pub fn into_tree(self) -> ConfigTree {
        ConfigTree::Object(self.entries)
    }
}

impl From<ConfigMap> for MemoryContainer {
    fn from(entries: ConfigMap) -> Self {
        Self { entries }
    }
}

impl Container for MemoryContainer {
    fn has(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    fn get(&self, key: &str) -> Option<&ConfigTree> {
        self.entries.get(key)
    }

    fn set(&mut self, key: &str, value: ConfigTree) {
        self.entries.insert(key.to_string(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn set_then_get() {
        let mut container = MemoryContainer::new();
        assert!(!container.has("debug"));

        container.set("debug", json!(true));
        assert!(container.has("debug"));
        assert_eq!(container.get("debug"), Some(&json!(true)));
        assert_eq!(container.len(), 1);
    }

    #[test]
    fn keys_keep_insertion_order() {
        let mut container = MemoryContainer::new();
        container.set("b", json!(1));
        container.set("a", json!(2));
        container.set("b", json!(3));
        assert_eq!(container.keys().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(container.into_tree(), json!({"b": 3, "a": 2}));
    }
}
