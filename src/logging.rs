//! Logging setup
//!
//! Installs a global `tracing` subscriber writing to stderr, so log lines
//! never mix with the wizard output on stdout. `RUST_LOG` wins over the
//! level derived from verbosity and config.

use crate::cli::{Config, Verbosity};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::io;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per event
    Json,
    /// Multi-line, for development
    Pretty,
    /// Single line per event
    Compact,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    /// Filter directive (trace, debug, info, warn, error, or a full EnvFilter)
    pub level: String,
    pub format: LogFormat,
    /// Include source file and line numbers
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".into(),
            format: LogFormat::Compact,
            include_location: false,
        }
    }
}

impl LoggingConfig {
    /// Build from the loaded config and the command-line verbosity
    ///
    /// `-v` and `-vv` raise the level above the configured one; `-q` only
    /// lets errors through.
    pub fn from_config(config: &Config, verbosity: Verbosity) -> Self {
        let level = match verbosity {
            Verbosity::Quiet => "error".to_string(),
            Verbosity::Normal => config.logging.level.clone(),
            Verbosity::Verbose => "nutricare=info".to_string(),
            Verbosity::VeryVerbose => "nutricare=debug".to_string(),
        };

        Self {
            level,
            format: config.logging.format,
            include_location: config.logging.include_location,
        }
    }

    /// RUST_LOG if set, else the configured level
    pub fn env_filter(&self) -> EnvFilter {
        match env::var("RUST_LOG") {
            Ok(directive) => EnvFilter::new(directive),
            Err(_) => EnvFilter::new(&self.level),
        }
    }

    /// Initialize the global tracing subscriber
    pub fn init(&self) -> Result<()> {
        let registry = tracing_subscriber::registry().with(self.env_filter());

        match self.format {
            LogFormat::Json => {
                let layer = fmt::layer()
                    .with_file(self.include_location)
                    .with_line_number(self.include_location)
                    .with_target(true)
                    .with_writer(io::stderr)
                    .json();
                registry.with(layer).try_init()
            }
            LogFormat::Pretty => {
                let layer = fmt::layer()
                    .pretty()
                    .with_file(self.include_location)
                    .with_line_number(self.include_location)
                    .with_target(true)
                    .with_writer(io::stderr);
                registry.with(layer).try_init()
            }
            LogFormat::Compact => {
                let layer = fmt::layer()
                    .compact()
                    .with_file(self.include_location)
                    .with_line_number(self.include_location)
                    .with_target(false)
                    .with_writer(io::stderr);
                registry.with(layer).try_init()
            }
        }
        .context("Failed to install tracing subscriber")?;

        tracing::debug!(level = %self.level, format = ?self.format, "logging initialised");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_overrides_level() {
        let config = Config::default();

        assert_eq!(LoggingConfig::from_config(&config, Verbosity::Quiet).level, "error");
        assert_eq!(LoggingConfig::from_config(&config, Verbosity::Normal).level, "warn");
        assert_eq!(
            LoggingConfig::from_config(&config, Verbosity::VeryVerbose).level,
            "nutricare=debug"
        );
    }

    #[test]
    fn test_format_follows_config() {
        let mut config = Config::default();
        config.logging.format = LogFormat::Json;
        config.logging.include_location = true;

        let logging = LoggingConfig::from_config(&config, Verbosity::Normal);
        assert_eq!(logging.format, LogFormat::Json);
        assert!(logging.include_location);
    }

    #[test]
    fn test_log_format_serde_names() {
        assert_eq!(serde_json::to_string(&LogFormat::Pretty).unwrap(), "\"pretty\"");
        let parsed: LogFormat = serde_json::from_str("\"json\"").unwrap();
        assert_eq!(parsed, LogFormat::Json);
    }
}
