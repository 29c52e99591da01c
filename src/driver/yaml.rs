//! YAML driver
//!
//! Parsing needs the `yaml` cargo feature. Without it the driver still claims
//! `.yml`/`.yaml` files but refuses to load them, so the caller gets a clear
//! configuration error instead of an "unsupported format".

use super::{matches_extension, read_source, FormatDriver};
use crate::domain::ConfigTree;
use crate::error::Result;
use std::path::Path;

pub struct YamlDriver;

impl FormatDriver for YamlDriver {
    fn name(&self) -> &'static str {
        "yaml"
    }

    fn supports(&self, filename: &Path) -> bool {
        matches_extension(filename, &["yml", "yaml"])
    }

    fn load(&self, filename: &Path) -> Result<ConfigTree> {
        let content = read_source(filename)?;
        parse_yaml(&content, filename)
    }
}

#[cfg(feature = "yaml")]
pub fn parse_yaml(content: &str, filename: &Path) -> Result<ConfigTree> {
    use crate::domain::{empty_tree, into_root};
    use crate::error::ConfigError;

    if content.trim().is_empty() {
        return Ok(empty_tree());
    }

    let mut raw: serde_yaml::Value = serde_yaml::from_str(content)
        .map_err(|e| ConfigError::parse(filename, format!("Invalid YAML syntax: {e}")))?;
    // `<<: *anchor` merge keys
    raw.apply_merge()
        .map_err(|e| ConfigError::parse(filename, format!("Invalid YAML merge key: {e}")))?;

    let tree = convert(raw).map_err(|msg| ConfigError::parse(filename, msg))?;
    into_root(filename, tree)
}

#[cfg(not(feature = "yaml"))]
pub fn parse_yaml(_content: &str, _filename: &Path) -> Result<ConfigTree> {
    Err(crate::error::ConfigError::missing_dependency("yaml", "serde_yaml"))
}

#[cfg(feature = "yaml")]
fn convert(value: serde_yaml::Value) -> std::result::Result<ConfigTree, String> {
    use crate::domain::ConfigMap;
    use serde_yaml::Value;

    Ok(match value {
        Value::Null => ConfigTree::Null,
        Value::Bool(b) => ConfigTree::Bool(b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                ConfigTree::from(i)
            } else if let Some(u) = n.as_u64() {
                ConfigTree::from(u)
            } else {
                // .nan and .inf have no JSON number form
                let f = n.as_f64().unwrap_or(f64::NAN);
                serde_json::Number::from_f64(f)
                    .map(ConfigTree::Number)
                    .unwrap_or_else(|| ConfigTree::String(n.to_string()))
            }
        }
        Value::String(s) => ConfigTree::String(s),
        Value::Sequence(items) => {
            ConfigTree::Array(items.into_iter().map(convert).collect::<std::result::Result<_, _>>()?)
        }
        Value::Mapping(mapping) => {
            let mut map = ConfigMap::new();
            for (key, value) in mapping {
                map.insert(key_string(key)?, convert(value)?);
            }
            ConfigTree::Object(map)
        }
        Value::Tagged(tagged) => convert(tagged.value)?,
    })
}

#[cfg(feature = "yaml")]
fn key_string(key: serde_yaml::Value) -> std::result::Result<String, String> {
    use serde_yaml::Value;

    match key {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null => Ok(String::new()),
        Value::Tagged(tagged) => key_string(tagged.value),
        Value::Sequence(_) | Value::Mapping(_) => {
            Err("mapping keys must be scalars".to_string())
        }
    }
}


#[cfg(all(test, not(feature = "yaml")))]
mod tests {
    use super::*;
    use crate::error::ConfigError;

    #[test]
    fn missing_feature_is_configuration_error() {
        let err = parse_yaml("debug: true", Path::new("a.yml")).unwrap_err();
        assert!(matches!(err, ConfigError::Configuration(_)));
    }
}
