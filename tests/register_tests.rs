//! Integration tests for registering fixture files into a container

use config_provider::{
    ConfigError, ConfigLoader, ConfigTree, Container, DriverChain, FormatDriver, MemoryContainer,
};
use serde_json::json;
use similar_asserts::assert_eq;
use std::path::{Path, PathBuf};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures").join(name)
}

/// Extensions whose parser is compiled in.
fn extensions() -> Vec<&'static str> {
    let mut exts = vec!["json", "php"];
    if cfg!(feature = "yaml") {
        exts.push("yml");
    }
    if cfg!(feature = "toml") {
        exts.push("toml");
    }
    exts
}

#[test]
fn register_without_replacement() {
    for ext in extensions() {
        let mut container = MemoryContainer::new();
        ConfigLoader::new(fixture(&format!("config.{ext}")))
            .register(&mut container)
            .unwrap_or_else(|e| panic!("{ext}: {e}"));

        assert_eq!(container.get("debug"), Some(&json!(true)), "{ext}");
        assert_eq!(container.get("data"), Some(&json!("%data%")), "{ext}");
    }
}

#[test]
fn register_with_replacement() {
    for ext in extensions() {
        let mut container = MemoryContainer::new();
        ConfigLoader::new(fixture(&format!("config.{ext}")))
            .replacements([("data", "test-replacement")])
            .register(&mut container)
            .unwrap_or_else(|e| panic!("{ext}: {e}"));

        assert_eq!(container.get("debug"), Some(&json!(true)), "{ext}");
        assert_eq!(container.get("data"), Some(&json!("test-replacement")), "{ext}");
    }
}

#[test]
fn empty_configs_load_as_empty_trees() {
    for ext in extensions() {
        let tree = ConfigLoader::new(fixture(&format!("config_empty.{ext}")))
            .read_config()
            .unwrap_or_else(|e| panic!("{ext}: {e}"));
        assert_eq!(tree, json!({}), "{ext}");
    }
}

#[test]
fn in_file_replacements() {
    for ext in extensions() {
        let mut container = MemoryContainer::new();
        ConfigLoader::new(fixture(&format!("config_replacement.{ext}")))
            .register(&mut container)
            .unwrap_or_else(|e| panic!("{ext}: {e}"));

        assert_eq!(container.get("%path%"), Some(&json!("/var/www")), "{ext}");
        assert_eq!(container.get("path.images"), Some(&json!("/var/www/web/images")), "{ext}");
        assert_eq!(container.get("path.upload"), Some(&json!("/var/www/upload")), "{ext}");
        assert_eq!(container.get("%url%"), Some(&json!("http://example.com")), "{ext}");
        assert_eq!(container.get("url.images"), Some(&json!("http://example.com/images")), "{ext}");
    }
}

#[test]
fn invalid_configs_are_parse_errors() {
    for ext in extensions() {
        let err = ConfigLoader::new(fixture(&format!("config_invalid.{ext}")))
            .read_config()
            .expect_err(ext);
        assert!(matches!(err, ConfigError::Parse { .. }), "{ext}: {err:?}");
        assert!(err.to_string().contains("config_invalid"), "{ext}: {err}");
    }
}

#[test]
fn unclaimed_extension_is_unsupported() {
    let err = ConfigLoader::new(fixture("config.ini")).read_config().unwrap_err();
    assert!(matches!(err, ConfigError::UnsupportedFormat(_)));
    assert!(err.to_string().contains("config.ini"));
}

#[test]
fn missing_file_is_reported_with_its_name() {
    let err = ConfigLoader::new(fixture("nope.json")).read_config().unwrap_err();
    assert!(matches!(err, ConfigError::FileNotFound(_)));
    assert!(err.to_string().contains("nope.json"));
}

#[test]
fn dist_files_load() {
    let mut container = MemoryContainer::new();
    ConfigLoader::new(fixture("config.json.dist"))
        .replacement("data", "from-dist")
        .register(&mut container)
        .expect("json.dist");
    assert_eq!(container.get("debug"), Some(&json!(false)));
    assert_eq!(container.get("data"), Some(&json!("from-dist")));

    if cfg!(feature = "yaml") {
        let mut container = MemoryContainer::new();
        ConfigLoader::new(fixture("config.yaml.dist")).register(&mut container).expect("yaml.dist");
        assert_eq!(container.get("debug"), Some(&json!(false)));
    }
}

#[test]
fn later_files_deep_merge_into_earlier_ones() {
    if !cfg!(feature = "yaml") {
        return;
    }

    let mut container = MemoryContainer::new();
    container.set("db", json!({"host": "a", "port": 5, "options": {"retries": 3}}));

    ConfigLoader::new(fixture("database.yml")).register(&mut container).expect("register");

    assert_eq!(
        container.into_tree(),
        json!({"db": {"host": "a", "port": 6, "options": {"retries": 3, "timeout": 30}}})
    );
}

#[test]
fn prefix_keeps_config_out_of_the_top_level() {
    let mut container = MemoryContainer::new();
    ConfigLoader::new(fixture("config.json"))
        .prefix("app")
        .replacement("data", "x")
        .register(&mut container)
        .expect("register");

    assert_eq!(container.into_tree(), json!({"app": {"debug": true, "data": "x"}}));
}

struct StaticDriver(&'static str);

impl FormatDriver for StaticDriver {
    fn name(&self) -> &'static str {
        self.0
    }

    fn supports(&self, filename: &Path) -> bool {
        filename.extension().is_some_and(|e| e == "json")
    }

    fn load(&self, _filename: &Path) -> config_provider::Result<ConfigTree> {
        Ok(json!({ "loaded_by": self.0 }))
    }
}

#[test]
fn first_matching_driver_loads_the_file() {
    let chain = DriverChain::empty().with_driver(StaticDriver("first")).with_driver(StaticDriver("second"));

    let mut container = MemoryContainer::new();
    ConfigLoader::new(fixture("config.json")).drivers(chain).register(&mut container).expect("register");

    assert_eq!(container.get("loaded_by"), Some(&json!("first")));
}
