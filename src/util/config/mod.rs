//! traitclass configuration system
//!
//! # Configuration hierarchy
//!
//! ```text
//! Priority (high → low):
//! 1. CLI arguments
//! 2. Environment variables (TRAITCLASS_LOG)
//! 3. User-level (~/.config/traitclass/config.ron)
//! 4. Default values
//! ```
//!
//! # Usage
//!
//! ```rust
//! use traitclass::util::config::{load_user_config, UserConfig};
//!
//! // Returns defaults when no config file exists
//! let config = load_user_config().unwrap_or_default();
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::inspect::SchemaFormat;
use crate::util::logger::LogLevel;

/// Environment variable overriding the configured log level
pub const LOG_ENV: &str = "TRAITCLASS_LOG";

/// User-level configuration for traitclass
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct UserConfig {
    /// Log settings
    #[serde(default)]
    pub log: LogConfig,
    /// Report settings
    #[serde(default)]
    pub report: ReportConfig,
    /// Schema settings
    #[serde(default)]
    pub schema: SchemaConfig,
}

/// Log configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct LogConfig {
    /// Log level
    #[serde(default)]
    pub level: LogLevel,
}

impl LogConfig {
    /// Configured level, overridden by `TRAITCLASS_LOG` when it parses
    pub fn effective_level(&self) -> LogLevel {
        std::env::var(LOG_ENV)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(self.level)
    }
}

/// Report configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportConfig {
    /// Colored text output
    #[serde(default = "default_colors")]
    pub colors: bool,
    /// Include double-underscore names in member tables
    #[serde(default)]
    pub show_private: bool,
}

fn default_colors() -> bool {
    true
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            colors: true,
            show_private: false,
        }
    }
}

/// Schema configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct SchemaConfig {
    /// Format used when the file extension is not recognized
    #[serde(default)]
    pub default_format: SchemaFormat,
}

/// Get the user config directory
pub fn get_config_dir() -> Option<PathBuf> {
    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        return Some(PathBuf::from(xdg_config).join("traitclass"));
    }

    if let Ok(home) = std::env::var("HOME") {
        return Some(PathBuf::from(home).join(".config").join("traitclass"));
    }

    if let Ok(appdata) = std::env::var("APPDATA") {
        return Some(PathBuf::from(appdata).join("traitclass"));
    }

    None
}

/// Get the user config file path (~/.config/traitclass/config.ron)
pub fn get_config_path() -> Option<PathBuf> {
    get_config_dir().map(|dir| dir.join("config.ron"))
}

/// Load user-level configuration
/// Returns default config if file doesn't exist
pub fn load_user_config() -> Result<UserConfig, ConfigError> {
    match get_config_path() {
        Some(path) => load_config_from(&path),
        None => Ok(UserConfig::default()),
    }
}

/// Load configuration from an explicit path
/// Returns default config if file doesn't exist
pub fn load_config_from(path: &Path) -> Result<UserConfig, ConfigError> {
    if !path.exists() {
        return Ok(UserConfig::default());
    }

    let content = fs::read_to_string(path).map_err(ConfigError::IoError)?;

    ron::from_str(&content).map_err(ConfigError::ParseError)
}

/// Save configuration to an explicit path, creating parent directories
pub fn save_config_to(
    config: &UserConfig,
    path: &Path,
) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        if !dir.exists() {
            fs::create_dir_all(dir).map_err(ConfigError::IoError)?;
        }
    }

    let content = ron::ser::to_string_pretty(config, ron::ser::PrettyConfig::default())
        .map_err(ConfigError::SerializeError)?;
    fs::write(path, content).map_err(ConfigError::IoError)?;

    Ok(())
}

/// Save user-level configuration
pub fn save_user_config(config: &UserConfig) -> Result<(), ConfigError> {
    let path = get_config_path().ok_or(ConfigError::NoConfigDir)?;
    save_config_to(config, &path)
}

/// Configuration errors
#[derive(Debug)]
pub enum ConfigError {
    IoError(std::io::Error),
    ParseError(ron::error::SpannedError),
    SerializeError(ron::Error),
    NoConfigDir,
}

impl std::fmt::Display for ConfigError {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::ParseError(e) => write!(f, "Config parse error: {}", e),
            ConfigError::SerializeError(e) => write!(f, "Config serialize error: {}", e),
            ConfigError::NoConfigDir => write!(f, "Cannot determine config directory"),
        }
    }
}

impl std::error::Error for ConfigError {}
