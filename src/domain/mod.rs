//! Core data types shared by drivers, the resolver and the merger

use crate::error::{ConfigError, Result};
use std::path::Path;

pub mod container;

pub use container::{Container, MemoryContainer};

/// A parsed configuration document.
///
/// Every driver converts its parser's native value into this one type, so the
/// resolver and merger never care which format a file was written in. Maps
/// keep the key order of the source file.
pub type ConfigTree = serde_json::Value;

/// The string-keyed, insertion-ordered map inside a [`ConfigTree`].
pub type ConfigMap = serde_json::Map<String, ConfigTree>;

pub fn empty_tree() -> ConfigTree {
    ConfigTree::Object(ConfigMap::new())
}

/// Coerce a freshly parsed document into a top-level map.
///
/// `null` (an empty YAML or JSON document) becomes an empty map, a sequence is
/// keyed by index, and a bare scalar is rejected.
pub(crate) fn into_root(path: &Path, value: ConfigTree) -> Result<ConfigTree> {
    match value {
        ConfigTree::Null => Ok(empty_tree()),
        ConfigTree::Object(_) => Ok(value),
        ConfigTree::Array(items) => Ok(ConfigTree::Object(
            items.into_iter().enumerate().map(|(i, v)| (i.to_string(), v)).collect(),
        )),
        other => Err(ConfigError::parse(
            path,
            format!("expected a map at the document root, found {}", kind_of(&other)),
        )),
    }
}

/// Render a value as the text a placeholder or string concatenation sees.
///
/// `true` is `"1"`, `false` and `null` are empty, whole floats drop their
/// fraction, and collections fall back to compact JSON.
pub fn stringify(value: &ConfigTree) -> String {
    match value {
        ConfigTree::Null => String::new(),
        ConfigTree::Bool(true) => "1".to_string(),
        ConfigTree::Bool(false) => String::new(),
        ConfigTree::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => {
                format!("{}", f as i64)
            }
            _ => n.to_string(),
        },
        ConfigTree::String(s) => s.clone(),
        ConfigTree::Array(_) | ConfigTree::Object(_) => value.to_string(),
    }
}

pub(crate) fn kind_of(value: &ConfigTree) -> &'static str {
    match value {
        ConfigTree::Null => "null",
        ConfigTree::Bool(_) => "a boolean",
        ConfigTree::Number(_) => "a number",
        ConfigTree::String(_) => "a string",
        ConfigTree::Array(_) => "a sequence",
        ConfigTree::Object(_) => "a map",
    }
}
