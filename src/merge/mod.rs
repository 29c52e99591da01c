//! Merging loaded config into a container
//!
//! New values win, but a nested structure that already exists in the
//! container is merged into rather than replaced, so keys the new file does
//! not mention survive.

use crate::domain::{ConfigMap, ConfigTree, Container};
use crate::placeholder::PlaceholderResolver;

pub struct ConfigMerger<'a> {
    resolver: &'a PlaceholderResolver,
}

impl<'a> ConfigMerger<'a> {
    pub fn new(resolver: &'a PlaceholderResolver) -> Self {
        Self { resolver }
    }

    /// Merge every top-level entry of `tree` into `container`.
    ///
    /// With a non-empty `prefix` the whole tree is stored under that single
    /// key instead. Never fails: a collection meeting a scalar (either way
    /// round) simply overwrites it.
    pub fn merge<C>(&self, container: &mut C, tree: ConfigTree, prefix: Option<&str>)
    where
        C: Container + ?Sized,
    {
        let entries = match prefix.filter(|p| !p.is_empty()) {
            Some(prefix) => {
                let mut nested = ConfigMap::new();
                nested.insert(prefix.to_string(), tree);
                nested
            }
            None => top_level_entries(tree),
        };

        for (name, value) in entries {
            let merged = match container.get(&name) {
                Some(current) if is_collection(current) && is_collection(&value) => {
                    tracing::trace!("Deep-merging {}", name);
                    self.merge_recursively(current.clone(), value)
                }
                _ => self.resolver.resolve(value),
            };
            container.set(&name, merged);
        }
    }

    /// Right-biased recursive union of two values.
    ///
    /// Maps merge key by key and sequences index by index. A map meeting a
    /// sequence merges as a map, with the sequence keyed `"0"`, `"1"`, ...
    /// A slot recurses only when both sides hold a collection there,
    /// otherwise the incoming value (with placeholders resolved) replaces it.
    pub fn merge_recursively(&self, current: ConfigTree, incoming: ConfigTree) -> ConfigTree {
        match (current, incoming) {
            (ConfigTree::Object(mut current), ConfigTree::Object(incoming)) => {
                for (key, value) in incoming {
                    match current.get_mut(&key) {
                        Some(slot) if is_collection(slot) && is_collection(&value) => {
                            let existing = std::mem::take(slot);
                            *slot = self.merge_recursively(existing, value);
                        }
                        _ => {
                            current.insert(key, self.resolver.resolve(value));
                        }
                    }
                }
                ConfigTree::Object(current)
            }
            (ConfigTree::Array(mut current), ConfigTree::Array(incoming)) => {
                for (index, value) in incoming.into_iter().enumerate() {
                    match current.get_mut(index) {
                        Some(slot) if is_collection(slot) && is_collection(&value) => {
                            let existing = std::mem::take(slot);
                            *slot = self.merge_recursively(existing, value);
                        }
                        Some(slot) => *slot = self.resolver.resolve(value),
                        None => current.push(self.resolver.resolve(value)),
                    }
                }
                ConfigTree::Array(current)
            }
            (ConfigTree::Object(current), ConfigTree::Array(incoming)) => self.merge_recursively(
                ConfigTree::Object(current),
                ConfigTree::Object(keyed_by_index(incoming)),
            ),
            (ConfigTree::Array(current), ConfigTree::Object(incoming)) => self.merge_recursively(
                ConfigTree::Object(keyed_by_index(current)),
                ConfigTree::Object(incoming),
            ),
            (_, incoming) => self.resolver.resolve(incoming),
        }
    }
}

fn is_collection(value: &ConfigTree) -> bool {
    value.is_object() || value.is_array()
}

fn keyed_by_index(items: Vec<ConfigTree>) -> ConfigMap {
    items.into_iter().enumerate().map(|(i, v)| (i.to_string(), v)).collect()
}

fn top_level_entries(tree: ConfigTree) -> ConfigMap {
    match tree {
        ConfigTree::Object(map) => map,
        ConfigTree::Array(items) => keyed_by_index(items),
        ConfigTree::Null => ConfigMap::new(),
        other => {
            tracing::warn!("Ignoring config root that is not a map: {}", other);
            ConfigMap::new()
        }
    }
}
