//! JSON driver

use super::{matches_extension, read_source, FormatDriver};
use crate::domain::{empty_tree, into_root, ConfigTree};
use crate::error::{ConfigError, Result};
use std::path::Path;

pub struct JsonDriver;

impl FormatDriver for JsonDriver {
    fn name(&self) -> &'static str {
        "json"
    }

    fn supports(&self, filename: &Path) -> bool {
        matches_extension(filename, &["json"])
    }

    fn load(&self, filename: &Path) -> Result<ConfigTree> {
        let content = read_source(filename)?;
        parse_json(&content, filename)
    }
}

/// Parse JSON text; blank input is an empty config rather than a syntax error.
pub fn parse_json(content: &str, filename: &Path) -> Result<ConfigTree> {
    if content.trim().is_empty() {
        return Ok(empty_tree());
    }

    let value: ConfigTree = serde_json::from_str(content).map_err(|e| {
        ConfigError::parse(
            filename,
            format!("Invalid JSON provided \"{}\" in \"{}\"", e, filename.display()),
        )
    })?;

    into_root(filename, value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn loads_json_file() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("config.json");
        fs::write(&path, r#"{"debug": true, "data": "%data%", "db": {"port": 5432}}"#)
            .expect("write");

        let tree = JsonDriver.load(&path).expect("load");
        assert_eq!(tree, json!({"debug": true, "data": "%data%", "db": {"port": 5432}}));
    }

    #[test]
    fn keeps_key_order() {
        let tree = parse_json(r#"{"z": 1, "a": 2, "m": 3}"#, Path::new("a.json")).expect("parse");
        let keys: Vec<_> = tree.as_object().expect("map").keys().cloned().collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn empty_input_is_empty_tree() {
        assert_eq!(parse_json("", Path::new("a.json")).expect("empty"), json!({}));
        assert_eq!(parse_json("  \n", Path::new("a.json")).expect("blank"), json!({}));
        assert_eq!(parse_json("null", Path::new("a.json")).expect("null"), json!({}));
    }

    #[test]
    fn syntax_error_is_parse_error() {
        let err = parse_json("{\"debug\": tru", Path::new("broken.json")).unwrap_err();
        match err {
            ConfigError::Parse { path, message } => {
                assert_eq!(path, Path::new("broken.json"));
                assert!(message.starts_with("Invalid JSON provided"), "{message}");
                assert!(message.contains("broken.json"));
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn dist_suffix_is_supported() {
        assert!(JsonDriver.supports(Path::new("config.json.dist")));
        assert!(!JsonDriver.supports(Path::new("config.yml")));
    }
}
