//! Configuration Loader
//!
//! Handles loading and merging configuration from multiple sources with proper precedence.

use crate::project::{validate_capacity, LogConfig, ProjectConfig, RunConfig, SeedSpec};
use crate::{ConfigError, ConfigResult};
use std::env;
use std::path::{Path, PathBuf};

/// Name of the per-project configuration file
pub const CONFIG_FILE_NAME: &str = "kiln.toml";

/// Bytes per diagnostic buffer when nothing else is configured
pub const DEFAULT_LOG_CAPACITY: usize = 128;

/// Configuration loader
///
/// Loads configuration from multiple sources and merges them with proper precedence:
/// 1. Project config (./kiln.toml) - lowest priority
/// 2. Environment variables (KILN_*) - overrides project
/// 3. CLI flags - highest priority (handled by caller)
pub struct ConfigLoader {
    /// Whether KILN_* environment variables are consulted
    read_env: bool,
}

/// Merged configuration result
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Project configuration (file and environment merged)
    pub project: ProjectConfig,

    /// Directory where kiln.toml was found
    pub project_root: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self { read_env: true }
    }

    /// Ignore KILN_* environment variables
    pub fn without_env(mut self) -> Self {
        self.read_env = false;
        self
    }

    /// Load configuration starting from the given directory
    ///
    /// Walks up the directory tree to find kiln.toml, then applies
    /// environment variable overrides.
    pub fn load_from_directory(&self, start_dir: &Path) -> ConfigResult<Config> {
        let (project_root, project_config) = self.find_project_config(start_dir)?;
        let project_config = self.apply_env_overrides(project_config)?;

        tracing::debug!(
            root = ?project_root,
            seed = ?project_config.seed(),
            capacity = ?project_config.log_capacity(),
            "resolved kiln configuration"
        );

        Ok(Config {
            project: project_config,
            project_root,
        })
    }

    /// Load configuration from a specific project config file
    pub fn load_from_file(&self, config_path: &Path) -> ConfigResult<Config> {
        let project_config = ProjectConfig::load_from_file(config_path)?;
        let project_config = self.apply_env_overrides(project_config)?;
        let project_root = config_path.parent().map(|p| p.to_path_buf());

        Ok(Config {
            project: project_config,
            project_root,
        })
    }

    /// Find project configuration by walking up directory tree
    ///
    /// Returns (project_root, project_config); a missing file yields defaults
    fn find_project_config(
        &self,
        start_dir: &Path,
    ) -> ConfigResult<(Option<PathBuf>, ProjectConfig)> {
        let mut current = start_dir.to_path_buf();

        loop {
            let config_path = current.join(CONFIG_FILE_NAME);

            if config_path.exists() {
                let project_config = ProjectConfig::load_from_file(&config_path)?;
                return Ok((Some(current), project_config));
            }

            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => return Ok((None, ProjectConfig::default())),
            }
        }
    }

    /// Apply environment variable overrides to project config
    ///
    /// KILN_SEED, KILN_PREFIX and KILN_LOG_CAPACITY are recognised.
    fn apply_env_overrides(&self, mut config: ProjectConfig) -> ConfigResult<ProjectConfig> {
        if !self.read_env {
            return Ok(config);
        }

        if let Ok(seed) = env::var("KILN_SEED") {
            config.run.get_or_insert_with(RunConfig::default).seed = Some(SeedSpec::Text(seed));
        }

        if let Ok(prefix) = env::var("KILN_PREFIX") {
            config.run.get_or_insert_with(RunConfig::default).prefix = Some(prefix);
        }

        if let Ok(capacity) = env::var("KILN_LOG_CAPACITY") {
            let parsed = capacity
                .trim()
                .parse::<usize>()
                .map_err(|e| ConfigError::InvalidValue {
                    field: "KILN_LOG_CAPACITY".to_string(),
                    reason: e.to_string(),
                })?;
            validate_capacity(parsed)?;
            config.log.get_or_insert_with(LogConfig::default).capacity = Some(parsed);
        }

        Ok(config)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    /// Seed from file or environment; `None` means "derive from the clock"
    pub fn seed(&self) -> Option<u32> {
        self.project.seed()
    }

    /// Name prefix filter (empty selects every test)
    pub fn prefix(&self) -> &str {
        self.project.prefix().unwrap_or("")
    }

    /// Bytes per diagnostic buffer
    pub fn log_capacity(&self) -> usize {
        self.project.log_capacity().unwrap_or(DEFAULT_LOG_CAPACITY)
    }

    /// Get the project root directory
    pub fn project_root(&self) -> Option<&Path> {
        self.project_root.as_deref()
    }

    /// Check if a kiln.toml was found
    pub fn is_project(&self) -> bool {
        self.project_root.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    fn create_config_file(dir: &Path, content: &str) -> PathBuf {
        let config_path = dir.join(CONFIG_FILE_NAME);
        fs::write(&config_path, content).unwrap();
        config_path
    }

    #[test]
    fn test_find_config_in_parent() {
        let temp_dir = TempDir::new().unwrap();
        create_config_file(temp_dir.path(), "[run]\nseed = 7\n");

        let sub_dir = temp_dir.path().join("subdir");
        fs::create_dir(&sub_dir).unwrap();

        let config = ConfigLoader::new()
            .without_env()
            .load_from_directory(&sub_dir)
            .unwrap();

        assert_eq!(config.seed(), Some(7));
        assert_eq!(config.project_root(), Some(temp_dir.path()));
    }

    #[test]
    fn test_defaults_without_file() {
        let temp_dir = TempDir::new().unwrap();

        let config = ConfigLoader::new()
            .without_env()
            .load_from_directory(temp_dir.path())
            .unwrap();

        assert!(!config.is_project());
        assert_eq!(config.seed(), None);
        assert_eq!(config.prefix(), "");
        assert_eq!(config.log_capacity(), DEFAULT_LOG_CAPACITY);
    }

    #[test]
    #[serial]
    fn test_env_override_seed() {
        let temp_dir = TempDir::new().unwrap();
        create_config_file(temp_dir.path(), "[run]\nseed = 7\n");

        env::set_var("KILN_SEED", "0x10");
        let config = ConfigLoader::new()
            .load_from_directory(temp_dir.path())
            .unwrap();
        env::remove_var("KILN_SEED");

        assert_eq!(config.seed(), Some(16));
    }

    #[test]
    #[serial]
    fn test_env_override_capacity_rejects_garbage() {
        let temp_dir = TempDir::new().unwrap();

        env::set_var("KILN_LOG_CAPACITY", "lots");
        let result = ConfigLoader::new().load_from_directory(temp_dir.path());
        env::remove_var("KILN_LOG_CAPACITY");

        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }
}
