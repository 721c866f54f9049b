//! Configuration management for NutriCare
//!
//! Provides TOML-based configuration with defaults and validation.
//! Location: ~/.nutricare/config.toml

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::errors::{Result, WizardError};
use crate::logging::LogFormat;

/// Complete configuration for NutriCare
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub display: DisplayConfig,
    pub paths: PathsConfig,
    pub logging: LogConfig,
}

/// Terminal display configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub default_verbosity: String,
    pub show_progress_bars: bool,
    pub color_output: bool,
    /// Clear the screen when the wizard moves to the next step
    pub clear_on_step: bool,
}

/// File system paths configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub state_dir: String,
    pub history_file: String,
    pub export_dir: String,
}

/// Log output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default filter when RUST_LOG is unset
    pub level: String,
    pub format: LogFormat,
    pub include_location: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            default_verbosity: "normal".to_string(),
            show_progress_bars: true,
            color_output: true,
            clear_on_step: false,
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            state_dir: "~/.nutricare".to_string(),
            history_file: "~/.nutricare/history.txt".to_string(),
            export_dir: "~/.nutricare/exports".to_string(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Compact,
            include_location: false,
        }
    }
}

impl Config {
    /// Load configuration from file or use defaults
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        if let Some(config_path) = path {
            Self::load_from_file(&config_path)
        } else {
            Self::load_default()
        }
    }

    /// Load configuration from specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| WizardError::ConfigError(format!("Failed to read config: {}", e)))?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| WizardError::ConfigError(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Load default configuration from standard location or use built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Some(path) = Self::default_path() {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Config::default())
    }

    /// Standard config location
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".nutricare").join("config.toml"))
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        match self.display.default_verbosity.as_str() {
            "quiet" | "normal" | "verbose" | "very_verbose" => {}
            _ => return Err(WizardError::ConfigError(
                format!("Invalid verbosity level: {}", self.display.default_verbosity)
            )),
        }

        if self.logging.level.trim().is_empty() {
            return Err(WizardError::ConfigError(
                "logging.level must not be empty".to_string()
            ));
        }

        if self.paths.history_file.trim().is_empty() {
            return Err(WizardError::ConfigError(
                "paths.history_file must not be empty".to_string()
            ));
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| WizardError::ConfigError(format!("Failed to serialize config: {}", e)))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| WizardError::ConfigError(format!("Failed to create config dir: {}", e)))?;
        }

        std::fs::write(path, contents)
            .map_err(|e| WizardError::ConfigError(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Expand tilde in paths
    pub fn expand_path(path: &str) -> PathBuf {
        if let Some(rest) = path.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(rest);
            }
        }
        PathBuf::from(path)
    }

    /// Get state directory path
    pub fn state_dir(&self) -> PathBuf {
        Self::expand_path(&self.paths.state_dir)
    }

    /// Get REPL history file path
    pub fn history_file(&self) -> PathBuf {
        Self::expand_path(&self.paths.history_file)
    }

    /// Get export directory path
    pub fn export_dir(&self) -> PathBuf {
        Self::expand_path(&self.paths.export_dir)
    }

    /// Resolve an export target; bare file names land in the export directory
    pub fn resolve_export_path(&self, target: &str) -> PathBuf {
        let path = Self::expand_path(target);
        if path.is_absolute() || path.parent().map_or(false, |p| !p.as_os_str().is_empty()) {
            path
        } else {
            self.export_dir().join(path)
        }
    }
}
