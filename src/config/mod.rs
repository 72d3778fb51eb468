//! Configuration management
//!
//! Layered loading with support for:
//! - TOML configuration files
//! - Environment variable overrides
//! - Per-environment files (development, test, staging, production)
//!
//! # Configuration Priority (lowest to highest)
//! 1. Built-in defaults
//! 2. `default.toml`
//! 3. `{environment}.toml`
//! 4. `local.toml` (not committed to version control)
//! 5. `TABLEFEED_*` environment variables
//! 6. Command-line flags (see [`crate::cli::ConfigurationMerger`])

pub mod environment;
pub mod error;
pub mod loader;
pub mod settings;
pub mod validation;

pub use environment::Environment;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use settings::{
    ApplicationConfig, FeedConfig, LoggerSettings, Settings, SoundBackend, SoundConfig,
    StreamConfig,
};
