//! Configuration loading and precedence tests

use kiln_config::{ConfigError, ConfigLoader, ProjectConfig, CONFIG_FILE_NAME};
use pretty_assertions::assert_eq;
use serial_test::serial;
use std::env;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn create_config_file(dir: &Path, content: &str) -> std::path::PathBuf {
    let config_path = dir.join(CONFIG_FILE_NAME);
    fs::write(&config_path, content).unwrap();
    config_path
}

// ============================================================================
// Config Loading Tests
// ============================================================================

#[test]
fn test_load_project_config_basic() {
    let temp_dir = TempDir::new().unwrap();
    let content = r#"
[run]
seed = "052"
prefix = "log"

[log]
capacity = 512
"#;
    create_config_file(temp_dir.path(), content);

    let config = ConfigLoader::new()
        .without_env()
        .load_from_directory(temp_dir.path())
        .unwrap();

    assert!(config.is_project());
    assert_eq!(config.seed(), Some(42));
    assert_eq!(config.prefix(), "log");
    assert_eq!(config.log_capacity(), 512);
}

#[test]
fn test_load_from_nested_subdirectory() {
    let temp_dir = TempDir::new().unwrap();
    create_config_file(temp_dir.path(), "[run]\nprefix = \"core\"\n");

    let nested = temp_dir.path().join("a").join("b");
    fs::create_dir_all(&nested).unwrap();

    let config = ConfigLoader::new()
        .without_env()
        .load_from_directory(&nested)
        .unwrap();

    assert_eq!(config.prefix(), "core");
    assert_eq!(config.project_root(), Some(temp_dir.path()));
}

#[test]
fn test_load_from_explicit_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = create_config_file(temp_dir.path(), "[log]\ncapacity = 64\n");

    let config = ConfigLoader::new().without_env().load_from_file(&path).unwrap();

    assert_eq!(config.log_capacity(), 64);
    assert_eq!(config.seed(), None);
}

#[test]
fn test_missing_explicit_file_is_not_found() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join(CONFIG_FILE_NAME);

    let result = ConfigLoader::new().without_env().load_from_file(&path);

    assert!(matches!(result, Err(ConfigError::NotFound(_))));
}

// ============================================================================
// Validation Tests
// ============================================================================

#[test]
fn test_invalid_toml_reports_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = create_config_file(temp_dir.path(), "[run\nseed = 1\n");

    match ProjectConfig::load_from_file(&path) {
        Err(ConfigError::TomlParseError { file, .. }) => assert_eq!(file, path),
        other => panic!("expected parse error, got {:?}", other),
    }
}

#[test]
fn test_zero_capacity_rejected() {
    let temp_dir = TempDir::new().unwrap();
    create_config_file(temp_dir.path(), "[log]\ncapacity = 0\n");

    let result = ConfigLoader::new()
        .without_env()
        .load_from_directory(temp_dir.path());

    assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
}

#[test]
fn test_unknown_section_rejected() {
    let temp_dir = TempDir::new().unwrap();
    create_config_file(temp_dir.path(), "[report]\ncolor = true\n");

    let result = ConfigLoader::new()
        .without_env()
        .load_from_directory(temp_dir.path());

    assert!(matches!(result, Err(ConfigError::TomlParseError { .. })));
}

// ============================================================================
// Environment Precedence Tests
// ============================================================================

#[test]
#[serial]
fn test_env_overrides_file() {
    let temp_dir = TempDir::new().unwrap();
    create_config_file(
        temp_dir.path(),
        "[run]\nseed = 1\nprefix = \"file\"\n[log]\ncapacity = 32\n",
    );

    env::set_var("KILN_SEED", "99");
    env::set_var("KILN_PREFIX", "env");
    env::set_var("KILN_LOG_CAPACITY", "4096");
    let config = ConfigLoader::new().load_from_directory(temp_dir.path());
    env::remove_var("KILN_SEED");
    env::remove_var("KILN_PREFIX");
    env::remove_var("KILN_LOG_CAPACITY");

    let config = config.unwrap();
    assert_eq!(config.seed(), Some(99));
    assert_eq!(config.prefix(), "env");
    assert_eq!(config.log_capacity(), 4096);
}

#[test]
#[serial]
fn test_env_applies_without_file() {
    let temp_dir = TempDir::new().unwrap();

    env::set_var("KILN_SEED", "-1");
    let config = ConfigLoader::new().load_from_directory(temp_dir.path());
    env::remove_var("KILN_SEED");

    let config = config.unwrap();
    assert!(!config.is_project());
    assert_eq!(config.seed(), Some(u32::MAX));
}

#[test]
#[serial]
fn test_env_capacity_out_of_range() {
    let temp_dir = TempDir::new().unwrap();

    env::set_var("KILN_LOG_CAPACITY", "0");
    let result = ConfigLoader::new().load_from_directory(temp_dir.path());
    env::remove_var("KILN_LOG_CAPACITY");

    assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
}

#[test]
#[serial]
fn test_without_env_ignores_variables() {
    let temp_dir = TempDir::new().unwrap();

    env::set_var("KILN_PREFIX", "ignored");
    let config = ConfigLoader::new()
        .without_env()
        .load_from_directory(temp_dir.path());
    env::remove_var("KILN_PREFIX");

    assert_eq!(config.unwrap().prefix(), "");
}
