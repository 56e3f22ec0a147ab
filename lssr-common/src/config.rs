//! Configuration loading and config file resolution
//!
//! Config file resolution priority:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (`LSSR_CONFIG`)
//! 3. Platform config directory (`<config_dir>/lssr/config.toml`)
//! 4. Compiled defaults (fallback)
//!
//! A missing file never aborts startup, even when named explicitly; a file
//! that exists but cannot be parsed is a configuration error. Loading does
//! not log: the caller reports the [`ConfigSource`] once logging is up.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "LSSR_CONFIG";

/// Configuration loaded from TOML
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
pub struct TomlConfig {
    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Restore workflow configuration (optional)
    #[serde(default)]
    pub restore: RestoreConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Interactive restore workflow settings
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RestoreConfig {
    /// Re-list restorable attempts after this many rejected ids
    #[serde(default = "default_relist_every")]
    pub relist_every: u32,

    /// Ask for confirmation before saving
    #[serde(default = "default_confirm")]
    pub confirm: bool,

    /// Appended to the input file stem to form the default output name
    #[serde(default = "default_output_suffix")]
    pub output_suffix: String,
}

impl Default for RestoreConfig {
    fn default() -> Self {
        Self {
            relist_every: default_relist_every(),
            confirm: default_confirm(),
            output_suffix: default_output_suffix(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_relist_every() -> u32 {
    5
}

fn default_confirm() -> bool {
    true
}

fn default_output_suffix() -> String {
    "-restored".to_string()
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig =
            toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    fn validate(&self) -> Result<()> {
        if self.restore.relist_every == 0 {
            return Err(Error::Config(
                "restore.relist_every must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Locate the config file following the priority order above.
///
/// Returns `None` when no candidate exists. An explicit path (argument or
/// environment variable) is returned even if missing so the fallback to
/// defaults can be reported as [`ConfigSource::Missing`].
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: Platform config directory
    default_config_path().filter(|path| path.exists())
}

/// Platform default config file location
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("lssr").join("config.toml"))
}

/// Where the active configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Parsed from this file
    File(PathBuf),
    /// This file was named but does not exist; defaults are in effect
    Missing(PathBuf),
    /// No file named or found; defaults are in effect
    Defaults,
}

/// Resolve and load configuration, falling back to compiled defaults.
pub fn load_config(cli_arg: Option<&Path>) -> Result<(TomlConfig, ConfigSource)> {
    match resolve_config_path(cli_arg) {
        Some(path) if !path.exists() => {
            Ok((TomlConfig::default(), ConfigSource::Missing(path)))
        }
        Some(path) => {
            let config = TomlConfig::load(&path)?;
            Ok((config, ConfigSource::File(path)))
        }
        // Priority 4: compiled defaults
        None => Ok((TomlConfig::default(), ConfigSource::Defaults)),
    }
}
