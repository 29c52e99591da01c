//! Format drivers
//!
//! Each driver recognizes one serialization format by file extension and turns
//! a file of that format into a [`ConfigTree`]. Drivers are tried in order by a
//! [`DriverChain`]; the first one that claims a filename loads it.
//!
//! Extension matching is case-insensitive and tolerates a trailing `.dist`
//! suffix, so `config.yaml.dist` is handled by the YAML driver.

use crate::domain::ConfigTree;
use crate::error::{ConfigError, Result};
use std::fs;
use std::path::Path;

pub mod chain;
pub mod json;
pub mod php;
pub mod toml;
pub mod yaml;

pub use chain::DriverChain;
pub use json::JsonDriver;
pub use php::PhpDriver;
pub use toml::TomlDriver;
pub use yaml::YamlDriver;

const DIST_SUFFIX: &str = ".dist";

pub trait FormatDriver: Send + Sync {
    /// Short format name, e.g. `"yaml"`.
    fn name(&self) -> &'static str;

    /// Whether this driver recognizes `filename`. Never touches the disk.
    fn supports(&self, filename: &Path) -> bool;

    fn load(&self, filename: &Path) -> Result<ConfigTree>;
}

/// Extension test shared by the built-in drivers.
///
/// `extensions` are given without the leading dot.
pub fn matches_extension(filename: &Path, extensions: &[&str]) -> bool {
    let name = filename.to_string_lossy().to_ascii_lowercase();
    let name = name.strip_suffix(DIST_SUFFIX).unwrap_or(&name);

    extensions.iter().any(|ext| {
        name.len() > ext.len()
            && name.ends_with(ext)
            && name.as_bytes()[name.len() - ext.len() - 1] == b'.'
    })
}

pub(crate) fn read_source(filename: &Path) -> Result<String> {
    fs::read_to_string(filename)
        .map_err(|source| ConfigError::Io { path: filename.to_path_buf(), source })
}
