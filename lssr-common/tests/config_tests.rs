//! Unit tests for configuration loading and graceful degradation
//!
//! Tests cover:
//! - Missing config files fall back to compiled defaults
//! - Priority order: argument, environment variable, platform default
//! - Partial TOML files keep defaults for omitted keys
//! - Malformed or invalid TOML is reported as a configuration error
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.
//! Tests that manipulate LSSR_CONFIG are marked with #[serial].

use lssr_common::config::{
    load_config, resolve_config_path, ConfigSource, LoggingConfig, RestoreConfig, TomlConfig,
    CONFIG_ENV_VAR,
};
use lssr_common::Error;
use serial_test::serial;
use std::env;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_defaults() {
    let config = TomlConfig::default();
    assert_eq!(config.logging.level, "info");
    assert_eq!(config.restore.relist_every, 5);
    assert!(config.restore.confirm);
    assert_eq!(config.restore.output_suffix, "-restored");
}

#[test]
fn test_empty_toml_uses_defaults() {
    let config = TomlConfig::from_toml_str("").unwrap();
    assert_eq!(config, TomlConfig::default());
}

#[test]
fn test_partial_toml_keeps_other_defaults() {
    let config = TomlConfig::from_toml_str(
        r#"
        [restore]
        confirm = false
        "#,
    )
    .unwrap();

    assert!(!config.restore.confirm);
    assert_eq!(config.restore.relist_every, 5);
    assert_eq!(config.logging, LoggingConfig::default());
}

#[test]
fn test_full_toml() {
    let config = TomlConfig::from_toml_str(
        r#"
        [logging]
        level = "debug"

        [restore]
        relist_every = 3
        confirm = false
        output_suffix = ".fixed"
        "#,
    )
    .unwrap();

    assert_eq!(config.logging.level, "debug");
    assert_eq!(
        config.restore,
        RestoreConfig {
            relist_every: 3,
            confirm: false,
            output_suffix: ".fixed".to_string(),
        }
    );
}

#[test]
fn test_malformed_toml_is_config_error() {
    let result = TomlConfig::from_toml_str("[restore\nconfirm = ");
    assert!(matches!(result, Err(Error::Config(_))));

    let result = TomlConfig::from_toml_str("[restore]\nrelist_every = \"often\"");
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn test_zero_relist_is_rejected() {
    let result = TomlConfig::from_toml_str("[restore]\nrelist_every = 0");
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
#[serial]
fn test_cli_argument_has_priority() {
    env::set_var(CONFIG_ENV_VAR, "/tmp/lssr-from-env.toml");
    let arg = PathBuf::from("/tmp/lssr-from-arg.toml");

    let resolved = resolve_config_path(Some(&arg));
    assert_eq!(resolved, Some(arg));

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_env_var_used_without_argument() {
    env::set_var(CONFIG_ENV_VAR, "/tmp/lssr-from-env.toml");

    let resolved = resolve_config_path(None);
    assert_eq!(resolved, Some(PathBuf::from("/tmp/lssr-from-env.toml")));

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_load_config_from_env_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.toml");
    fs::write(&path, "[logging]\nlevel = \"warn\"\n").unwrap();
    env::set_var(CONFIG_ENV_VAR, &path);

    let (config, source) = load_config(None).unwrap();
    assert_eq!(config.logging.level, "warn");
    assert_eq!(source, ConfigSource::File(path));

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_explicit_missing_file_uses_defaults() {
    env::remove_var(CONFIG_ENV_VAR);
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("nope.toml");

    let (config, source) = load_config(Some(&missing)).unwrap();
    assert_eq!(config, TomlConfig::default());
    assert_eq!(source, ConfigSource::Missing(missing.clone()));

    env::set_var(CONFIG_ENV_VAR, &missing);
    let (config, source) = load_config(None).unwrap();
    assert_eq!(config, TomlConfig::default());
    assert_eq!(source, ConfigSource::Missing(missing));

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_explicit_malformed_file_is_error() {
    env::remove_var(CONFIG_ENV_VAR);
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("bad.toml");
    fs::write(&path, "[restore\nrelist_every = ").unwrap();

    assert!(matches!(load_config(Some(&path)), Err(Error::Config(_))));
}
