//! Ordered driver dispatch

use super::{FormatDriver, JsonDriver, PhpDriver, TomlDriver, YamlDriver};
use crate::domain::ConfigTree;
use crate::error::{ConfigError, Result};
use std::path::Path;

/// An ordered list of drivers, itself usable as a driver.
///
/// Dispatch is a linear scan: the first driver whose `supports` returns true
/// loads the file, even if a later driver would also claim it.
pub struct DriverChain {
    drivers: Vec<Box<dyn FormatDriver>>,
}

impl Default for DriverChain {
    /// The built-in drivers in their fixed order: PHP, YAML, JSON, TOML.
    fn default() -> Self {
        Self::empty()
            .with_driver(PhpDriver)
            .with_driver(YamlDriver)
            .with_driver(JsonDriver)
            .with_driver(TomlDriver)
    }
}

impl DriverChain {
    pub fn new(drivers: Vec<Box<dyn FormatDriver>>) -> Self {
        Self { drivers }
    }

    pub fn empty() -> Self {
        Self { drivers: Vec::new() }
    }

    /// Append a driver after the ones already registered.
    pub fn with_driver(mut self, driver: impl FormatDriver + 'static) -> Self {
        self.drivers.push(Box::new(driver));
        self
    }

    pub fn len(&self) -> usize {
        self.drivers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drivers.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.drivers.iter().map(|d| d.name()).collect()
    }

    pub fn driver_for(&self, filename: &Path) -> Option<&dyn FormatDriver> {
        self.drivers.iter().find(|d| d.supports(filename)).map(|d| d.as_ref())
    }

    /// Name of the format that would be used to load `filename`.
    pub fn format_of(&self, filename: &Path) -> Option<&'static str> {
        self.driver_for(filename).map(|d| d.name())
    }
}

impl FormatDriver for DriverChain {
    fn name(&self) -> &'static str {
        "chain"
    }

    fn supports(&self, filename: &Path) -> bool {
        self.driver_for(filename).is_some()
    }

    fn load(&self, filename: &Path) -> Result<ConfigTree> {
        let Some(driver) = self.driver_for(filename) else {
            return Err(ConfigError::UnsupportedFormat(filename.to_path_buf()));
        };
        tracing::debug!("Loading {} with the {} driver", filename.display(), driver.name());
        driver.load(filename)
    }
}
