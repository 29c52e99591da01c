//! TOML driver
//!
//! Like the YAML driver, parsing sits behind a cargo feature (`toml`).

use super::{matches_extension, read_source, FormatDriver};
use crate::domain::ConfigTree;
use crate::error::Result;
use std::path::Path;

pub struct TomlDriver;

impl FormatDriver for TomlDriver {
    fn name(&self) -> &'static str {
        "toml"
    }

    fn supports(&self, filename: &Path) -> bool {
        matches_extension(filename, &["toml"])
    }

    fn load(&self, filename: &Path) -> Result<ConfigTree> {
        let content = read_source(filename)?;
        parse_toml(&content, filename)
    }
}

#[cfg(feature = "toml")]
pub fn parse_toml(content: &str, filename: &Path) -> Result<ConfigTree> {
    use crate::error::ConfigError;

    let table: ::toml::Table = ::toml::from_str(content)
        .map_err(|e| ConfigError::parse(filename, format!("Invalid TOML syntax: {e}")))?;

    Ok(convert(::toml::Value::Table(table)))
}

#[cfg(not(feature = "toml"))]
pub fn parse_toml(_content: &str, _filename: &Path) -> Result<ConfigTree> {
    Err(crate::error::ConfigError::missing_dependency("toml", "toml"))
}

#[cfg(feature = "toml")]
fn convert(value: ::toml::Value) -> ConfigTree {
    use ::toml::Value;

    match value {
        Value::String(s) => ConfigTree::String(s),
        Value::Integer(i) => ConfigTree::from(i),
        Value::Float(f) => serde_json::Number::from_f64(f)
            .map(ConfigTree::Number)
            .unwrap_or_else(|| ConfigTree::String(f.to_string())),
        Value::Boolean(b) => ConfigTree::Bool(b),
        Value::Datetime(dt) => ConfigTree::String(dt.to_string()),
        Value::Array(items) => ConfigTree::Array(items.into_iter().map(convert).collect()),
        Value::Table(table) => {
            ConfigTree::Object(table.into_iter().map(|(k, v)| (k, convert(v))).collect())
        }
    }
}

#[cfg(all(test, feature = "toml"))]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn loads_toml_file() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("config.toml");
        fs::write(&path, "debug = true\ndata = \"%data%\"\n\n[db]\nhost = \"localhost\"\nport = 5432\n")
            .expect("write");

        let tree = TomlDriver.load(&path).expect("load");
        assert_eq!(
            tree,
            json!({"debug": true, "data": "%data%", "db": {"host": "localhost", "port": 5432}})
        );
    }

    #[test]
    fn empty_document_is_empty_tree() {
        assert_eq!(parse_toml("", Path::new("a.toml")).expect("empty"), json!({}));
        assert_eq!(parse_toml("# nothing\n", Path::new("a.toml")).expect("comment"), json!({}));
    }

    #[test]
    fn datetimes_become_strings() {
        let tree = parse_toml("released = 1979-05-27T07:32:00Z\n", Path::new("a.toml")).expect("parse");
        assert_eq!(tree, json!({"released": "1979-05-27T07:32:00Z"}));
    }

    #[test]
    fn invalid_toml_is_parse_error() {
        let err = parse_toml("debug = \n", Path::new("bad.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
