//! Kiln Configuration System
//!
//! Provides run configuration for Kiln test binaries:
//! - Project configuration (kiln.toml)
//! - Environment overrides (KILN_*)
//! - Permissive seed parsing shared with the command line
//!
//! # Configuration Hierarchy
//!
//! Configuration is loaded and merged in the following order (later overrides earlier):
//! 1. Built-in defaults
//! 2. Project config (./kiln.toml, searched upwards)
//! 3. Environment variables (KILN_*)
//! 4. CLI flags (applied by the caller)
//!
//! # Example
//!
//! ```no_run
//! use kiln_config::ConfigLoader;
//! use std::path::Path;
//!
//! let loader = ConfigLoader::new();
//! let config = loader.load_from_directory(Path::new(".")).unwrap();
//! println!("log capacity: {}", config.log_capacity());
//! ```

pub mod loader;
pub mod project;
pub mod seed;

use std::path::PathBuf;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid TOML syntax in {file}: {error}")]
    TomlParseError {
        file: PathBuf,
        error: toml::de::Error,
    },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

// Re-export main types
pub use loader::{Config, ConfigLoader, CONFIG_FILE_NAME, DEFAULT_LOG_CAPACITY};
pub use project::{LogConfig, ProjectConfig, RunConfig, SeedSpec};
pub use seed::parse_permissive;
