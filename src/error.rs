//! Error taxonomy for config loading

use std::path::PathBuf;
use thiserror::Error;

/// Everything that can go wrong while reading a config file into a container.
///
/// Merging itself never fails, so every variant is raised before the
/// container is touched.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Invalid setup: no filename, or a parser crate compiled out.
    #[error("{0}")]
    Configuration(String),

    #[error("The config file '{}' does not exist.", .0.display())]
    FileNotFound(PathBuf),

    #[error("The config file '{}' appears to have an invalid format.", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("Unable to parse config file '{}': {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Failed reading config file '{}'", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConfigError {
    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse { path: path.into(), message: message.into() }
    }

    #[allow(dead_code)]
    pub(crate) fn missing_dependency(format: &str, dependency: &str) -> Self {
        Self::Configuration(format!(
            "Unable to read {format} as the {dependency} crate is not enabled. \
             Rebuild with the `{format}` feature."
        ))
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
