//! Configuration structures for deserialisation.
//!
//! These structures map directly to the JSON configuration file format.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::action::{DEFAULT_HOST, DEFAULT_PORT, DEFAULT_TIMEOUT_SECS};
use crate::error::ConfigError;

/// Longest add-in timeout accepted, in seconds.
const MAX_TIMEOUT_SECS: u64 = 600;

const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Root configuration structure.
///
/// This is the top-level structure that matches the JSON config file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Optional JSON schema reference (ignored during parsing).
    #[serde(rename = "$schema", default)]
    _schema: Option<String>,

    /// Optional comment field (ignored during parsing).
    #[serde(rename = "_comment", default)]
    _comment: Option<String>,

    /// Fusion add-in connection settings.
    #[serde(default)]
    pub addin: AddinConfig,

    /// Viewport screenshot settings.
    #[serde(default)]
    pub screenshot: ScreenshotConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any validation checks fail.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.addin.host.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                message: "addin.host must not be empty".to_string(),
            });
        }

        if self.addin.port == 0 {
            return Err(ConfigError::ValidationError {
                message: "addin.port must not be 0".to_string(),
            });
        }

        if self.addin.timeout_secs == 0 || self.addin.timeout_secs > MAX_TIMEOUT_SECS {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "Invalid addin.timeout_secs {}. Must be between 1 and {MAX_TIMEOUT_SECS}",
                    self.addin.timeout_secs
                ),
            });
        }

        let level = self.logging.level.to_lowercase();
        if !VALID_LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "Invalid log level '{}'. Must be one of: {}",
                    self.logging.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        Ok(())
    }
}

/// Connection settings for the Fusion add-in listener.
///
/// The MCP server uses these to reach the add-in; the add-in uses the same
/// values to bind its listener.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AddinConfig {
    /// Host name or address of the add-in listener.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port of the add-in listener.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Whether the add-in starts its listener when the host loads it.
    #[serde(default = "default_true")]
    pub run_on_startup: bool,
}

impl AddinConfig {
    /// Returns the request timeout as a [`Duration`].
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for AddinConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            timeout_secs: default_timeout_secs(),
            run_on_startup: default_true(),
        }
    }
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

const fn default_port() -> u16 {
    DEFAULT_PORT
}

const fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

const fn default_true() -> bool {
    true
}

/// Viewport screenshot settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScreenshotConfig {
    /// Directory the host writes screenshots into. Defaults to the system
    /// temporary directory.
    #[serde(default)]
    pub directory: Option<PathBuf>,

    /// Keep screenshot files after they have been returned to the client.
    #[serde(default)]
    pub keep_files: bool,
}

impl ScreenshotConfig {
    /// Returns the directory screenshots are written to.
    #[must_use]
    pub fn directory(&self) -> PathBuf {
        self.directory.clone().unwrap_or_else(std::env::temp_dir)
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
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

fn default_log_level() -> String {
    "warn".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_config() {
        let json = r"{}";
        let config: Config = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.addin.host, "localhost");
        assert_eq!(config.addin.port, 3600);
    }

    #[test]
    fn parse_full_config() {
        let json = r#"{
            "$schema": "https://json-schema.org/draft/2020-12/schema",
            "_comment": "Test config",
            "addin": {
                "host": "127.0.0.1",
                "port": 3700,
                "timeout_secs": 30,
                "run_on_startup": false
            },
            "screenshot": {
                "directory": "/tmp/fusion-shots",
                "keep_files": true
            },
            "logging": {
                "level": "debug"
            }
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.addin.host, "127.0.0.1");
        assert_eq!(config.addin.port, 3700);
        assert_eq!(config.addin.timeout(), Duration::from_secs(30));
        assert!(!config.addin.run_on_startup);
        assert_eq!(
            config.screenshot.directory(),
            PathBuf::from("/tmp/fusion-shots")
        );
        assert!(config.screenshot.keep_files);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn addin_config_defaults() {
        let config = AddinConfig::default();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 3600);
        assert_eq!(config.timeout_secs, 10);
        assert!(config.run_on_startup);
    }

    #[test]
    fn screenshot_defaults_to_temp_dir() {
        let config = ScreenshotConfig::default();
        assert_eq!(config.directory(), std::env::temp_dir());
        assert!(!config.keep_files);
    }

    #[test]
    fn logging_config_defaults() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "warn");
    }

    #[test]
    fn reject_zero_port() {
        let json = r#"{"addin": {"port": 0}}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn reject_out_of_range_timeout() {
        for timeout in [0, 601] {
            let json = format!(r#"{{"addin": {{"timeout_secs": {timeout}}}}}"#);
            let config: Config = serde_json::from_str(&json).unwrap();
            assert!(config.validate().is_err(), "timeout {timeout} accepted");
        }
    }

    #[test]
    fn reject_empty_host() {
        let json = r#"{"addin": {"host": "  "}}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn reject_unknown_log_level() {
        let json = r#"{"logging": {"level": "loud"}}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn reject_unknown_fields() {
        let json = r#"{
            "unknown_field": "value"
        }"#;

        let result: Result<Config, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }
}
