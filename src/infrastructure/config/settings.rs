//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all application settings.
//! Configuration is loaded from an optional TOML file; stream credentials are
//! never read from the file and come from the environment instead (see
//! [`TwitterCredentials`](crate::adapter::outbound::twitter::settings::TwitterCredentials)).
//!
//! # Example
//!
//! ```no_run
//! use twittervotes::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_or_default("config.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::io::ErrorKind;
use std::path::Path;

use serde::Deserialize;

use super::broker::BrokerConfig;
use super::logging::LoggingConfig;
use super::stream::StreamConfig;
use crate::adapter::outbound::nsq::protocol::is_valid_topic_name;
use crate::error::{ConfigError, Result};

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "TWITTERVOTES_CONFIG";

/// Config file used when [`CONFIG_PATH_ENV`] is unset.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Longest accepted timeout, backoff or interval (one week).
pub const MAX_DURATION_SECS: u64 = 7 * 24 * 60 * 60;

/// Main application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Logging and tracing configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Stream endpoint, connect timeout, backoff and idle-reap timing.
    #[serde(default)]
    pub stream: StreamConfig,

    /// nsqd address and publish topic.
    #[serde(default)]
    pub broker: BrokerConfig,

    /// Path to the SQLite poll database.
    ///
    /// Defaults to "ballots.db" in the current directory.
    #[serde(default = "default_database_path")]
    pub database: String,
}

fn default_database_path() -> String {
    "ballots.db".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            stream: StreamConfig::default(),
            broker: BrokerConfig::default(),
            database: default_database_path(),
        }
    }
}

impl Config {
    /// Parse configuration from TOML content.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML content is malformed or validation fails.
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is malformed, or fails
    /// validation.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Load configuration from a TOML file, falling back to defaults when the
    /// file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or is invalid.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::parse_toml(&content),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                let config = Self::default();
                config.validate()?;
                Ok(config)
            }
            Err(e) => Err(ConfigError::ReadFile(e).into()),
        }
    }

    /// Path of the config file: [`CONFIG_PATH_ENV`] or [`DEFAULT_CONFIG_PATH`].
    #[must_use]
    pub fn path_from_env() -> String {
        std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
    }

    /// Validate configuration values.
    fn validate(&self) -> Result<()> {
        if !self.logging.is_known_format() {
            return Err(ConfigError::InvalidValue {
                field: "logging.format",
                reason: format!("unknown format '{}', expected pretty or json", self.logging.format),
            }
            .into());
        }

        if self.stream.endpoint.is_empty() {
            return Err(ConfigError::MissingField {
                field: "stream.endpoint",
            }
            .into());
        }
        if let Err(e) = url::Url::parse(&self.stream.endpoint) {
            return Err(ConfigError::InvalidValue {
                field: "stream.endpoint",
                reason: e.to_string(),
            }
            .into());
        }
        check_secs("connect_timeout_secs", self.stream.connect_timeout_secs)?;
        check_secs("reconnect_backoff_secs", self.stream.reconnect_backoff_secs)?;
        check_secs("idle_reap_interval_secs", self.stream.idle_reap_interval_secs)?;

        if self.broker.address.is_empty() {
            return Err(ConfigError::MissingField {
                field: "broker.address",
            }
            .into());
        }
        if !is_valid_topic_name(&self.broker.topic) {
            return Err(ConfigError::InvalidValue {
                field: "broker.topic",
                reason: format!("'{}' is not a valid topic name", self.broker.topic),
            }
            .into());
        }
        check_secs("dial_timeout_secs", self.broker.dial_timeout_secs)?;
        check_secs("publish_timeout_secs", self.broker.publish_timeout_secs)?;

        if self.database.is_empty() {
            return Err(ConfigError::MissingField { field: "database" }.into());
        }
        Ok(())
    }

    /// Initialize logging with the configured settings.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}

fn check_secs(field: &'static str, secs: u64) -> Result<()> {
    if secs == 0 {
        return Err(ConfigError::InvalidValue {
            field,
            reason: "must be greater than 0".to_string(),
        }
        .into());
    }
    if secs > MAX_DURATION_SECS {
        return Err(ConfigError::InvalidValue {
            field,
            reason: format!("must be at most {MAX_DURATION_SECS}"),
        }
        .into());
    }
    Ok(())
}
