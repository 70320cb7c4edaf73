//! Project Configuration (kiln.toml)
//!
//! Handles run-level configuration stored in `kiln.toml` next to the test
//! binary's working directory (or any ancestor of it).

use crate::seed::parse_permissive;
use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Largest log buffer the diagnostic log can address.
pub const MAX_LOG_CAPACITY: usize = (u32::MAX / 2) as usize;

/// Project configuration from kiln.toml
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Run selection and seeding
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run: Option<RunConfig>,

    /// Diagnostic log sizing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log: Option<LogConfig>,
}

/// `[run]` section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    /// Random seed shared by every test in the run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<SeedSpec>,

    /// Only tests whose names start with this prefix run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
}

/// `[log]` section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// Bytes per diagnostic buffer (two buffers are allocated)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<usize>,
}

/// A seed written either as a TOML integer or as a permissive string
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum SeedSpec {
    /// `seed = 42`
    Number(u32),
    /// `seed = "0x2a"`
    Text(String),
}

impl SeedSpec {
    /// Resolve to the numeric seed
    pub fn value(&self) -> u32 {
        match self {
            SeedSpec::Number(n) => *n,
            SeedSpec::Text(s) => parse_permissive(s),
        }
    }
}

impl ProjectConfig {
    /// Load project configuration from a file
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::IoError(e)
            }
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::TomlParseError {
            file: path.to_path_buf(),
            error: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the project configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(capacity) = self.log.as_ref().and_then(|l| l.capacity) {
            validate_capacity(capacity)?;
        }
        Ok(())
    }

    /// Get the configured seed, if any
    pub fn seed(&self) -> Option<u32> {
        self.run
            .as_ref()
            .and_then(|r| r.seed.as_ref())
            .map(SeedSpec::value)
    }

    /// Get the configured name prefix, if any
    pub fn prefix(&self) -> Option<&str> {
        self.run.as_ref().and_then(|r| r.prefix.as_deref())
    }

    /// Get the configured log capacity, if any
    pub fn log_capacity(&self) -> Option<usize> {
        self.log.as_ref().and_then(|l| l.capacity)
    }
}

/// Check that a log capacity is addressable by the diagnostic log
pub fn validate_capacity(capacity: usize) -> ConfigResult<()> {
    if capacity == 0 || capacity > MAX_LOG_CAPACITY {
        return Err(ConfigError::InvalidValue {
            field: "log.capacity".to_string(),
            reason: format!("must be between 1 and {}, got {}", MAX_LOG_CAPACITY, capacity),
        });
    }
    Ok(())
}
