//! Config loader
//!
//! Ties the pieces together: read the file through the driver chain (or the
//! cache), harvest placeholder tokens defined in the file, then merge the tree
//! into the caller's container.

use crate::cache::ConfigCache;
use crate::domain::{ConfigTree, Container};
use crate::driver::{DriverChain, FormatDriver};
use crate::error::{ConfigError, Result};
use crate::merge::ConfigMerger;
use crate::placeholder::PlaceholderResolver;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub struct ConfigLoader {
    filename: PathBuf,
    replacements: PlaceholderResolver,
    driver: Box<dyn FormatDriver>,
    prefix: Option<String>,
    cache: Option<Arc<dyn ConfigCache>>,
}

impl ConfigLoader {
    /// A loader for `filename` using the default driver chain.
    pub fn new(filename: impl Into<PathBuf>) -> Self {
        Self {
            filename: filename.into(),
            replacements: PlaceholderResolver::default(),
            driver: Box::new(DriverChain::default()),
            prefix: None,
            cache: None,
        }
    }

    /// Add replacements by bare name; `("data", "x")` replaces `%data%`.
    pub fn replacements<I, K, V>(mut self, replacements: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        self.replacements.extend(replacements);
        self
    }

    pub fn replacement(self, name: &str, value: impl Into<String>) -> Self {
        self.replacements([(name, value.into())])
    }

    /// Replace the default chain with a custom driver (usually a [`DriverChain`]).
    pub fn drivers(mut self, driver: impl FormatDriver + 'static) -> Self {
        self.driver = Box::new(driver);
        self
    }

    /// Store the whole config under one container key. An empty prefix is the
    /// same as none.
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        self.prefix = (!prefix.is_empty()).then_some(prefix);
        self
    }

    pub fn cache(mut self, cache: Arc<dyn ConfigCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn filename(&self) -> &Path {
        &self.filename
    }

    /// Check the file and load it, without touching any container.
    pub fn read_config(&self) -> Result<ConfigTree> {
        if self.filename.as_os_str().is_empty() {
            return Err(ConfigError::Configuration(
                "A valid configuration file must be passed before reading the config.".to_string(),
            ));
        }

        if !self.filename.exists() {
            return Err(ConfigError::FileNotFound(self.filename.clone()));
        }

        let cache_key = self.filename.to_string_lossy();
        if let Some(cache) = &self.cache {
            if let Some(tree) = cache.get(&cache_key) {
                tracing::debug!("Config cache hit for {}", self.filename.display());
                return Ok(tree);
            }
        }

        if !self.driver.supports(&self.filename) {
            return Err(ConfigError::UnsupportedFormat(self.filename.clone()));
        }
        let tree = self.driver.load(&self.filename)?;

        if let Some(cache) = &self.cache {
            cache.set(&cache_key, tree.clone());
        }
        Ok(tree)
    }

    /// Load the file and merge it into `container`.
    ///
    /// Every error is raised before the container is modified. Tokens
    /// harvested from the file apply to this registration only; the loader's
    /// own replacements are left as configured.
    pub fn register<C>(&self, container: &mut C) -> Result<()>
    where
        C: Container + ?Sized,
    {
        let tree = self.read_config()?;

        let mut resolver = self.replacements.clone();
        resolver.harvest(&tree);

        ConfigMerger::new(&resolver).merge(container, tree, self.prefix.as_deref());
        tracing::debug!(
            "Registered {} ({} placeholders)",
            self.filename.display(),
            resolver.len()
        );
        Ok(())
    }
}
