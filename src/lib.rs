//! config-provider: load config files into a key-value container
//!
//! Reads JSON, YAML, TOML or PHP-literal files, substitutes `%name%`
//! placeholders (including ones the file defines for itself), and deep-merges
//! the result into a container such as a dependency-injection registry.
//!
//! ```no_run
//! use config_provider::{ConfigLoader, Container, MemoryContainer};
//!
//! let mut container = MemoryContainer::new();
//! ConfigLoader::new("config/app.yml")
//!     .replacement("root", "/var/www")
//!     .register(&mut container)?;
//! assert!(container.has("debug"));
//! # Ok::<(), config_provider::ConfigError>(())
//! ```

pub mod cache;
pub mod domain;
pub mod driver;
pub mod error;
pub mod loader;
pub mod merge;
pub mod placeholder;

pub use cache::{ConfigCache, MemoryCache};
pub use domain::{ConfigMap, ConfigTree, Container, MemoryContainer};
pub use driver::{DriverChain, FormatDriver};
pub use error::{ConfigError, Result};
pub use loader::ConfigLoader;
pub use merge::ConfigMerger;
pub use placeholder::PlaceholderResolver;
