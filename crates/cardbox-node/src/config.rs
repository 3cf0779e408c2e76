//! Service configuration.
//!
//! Built once at startup from, lowest precedence first: built-in defaults,
//! an optional YAML file, and `CARDBOX_`-prefixed environment variables
//! (`__` separates sections, e.g. `CARDBOX_STORE__URI`). Command-line flags
//! are applied on top by the binary.

use crate::observability::LogFormat;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use validator::Validate;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "CARDBOX";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A source could not be read or deserialized.
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// A value is out of range.
    #[error("invalid configuration: {0}")]
    Invalid(#[from] validator::ValidationErrors),
}

/// Configuration for the Cardbox node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, Validate)]
pub struct Config {
    #[validate(nested)]
    pub store: StoreConfig,
    #[validate(nested)]
    pub http: HttpConfig,
    pub log: LogConfig,
}

/// Document store settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Validate)]
pub struct StoreConfig {
    /// Store URI; the scheme selects the backend.
    #[validate(length(min = 1))]
    pub uri: String,
    /// Database name.
    #[validate(length(min = 1))]
    pub database: String,
    /// Collection holding the cards.
    #[validate(length(min = 1))]
    pub collection: String,
    /// Bound on the startup connection probe.
    #[validate(range(min = 1))]
    pub connect_timeout_secs: u64,
    /// Bound on each store call made while serving a request.
    #[validate(range(min = 1))]
    pub operation_timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            uri: "mongodb://localhost:27017/".to_string(),
            database: "devDb".to_string(),
            collection: "cards".to_string(),
            connect_timeout_secs: 10,
            operation_timeout_secs: 5,
        }
    }
}

impl StoreConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn operation_timeout(&self) -> Duration {
        Duration::from_secs(self.operation_timeout_secs)
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Validate)]
pub struct HttpConfig {
    /// Address to bind, `host:port`.
    #[validate(length(min = 1))]
    pub listen_addr: String,
    /// Bound on reading a request body.
    #[validate(range(min = 1))]
    pub read_timeout_secs: u64,
    /// Bound on handling a request, and on the shutdown drain.
    #[validate(range(min = 1))]
    pub write_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8080".to_string(),
            read_timeout_secs: 5,
            write_timeout_secs: 5,
        }
    }
}

impl HttpConfig {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_secs(self.write_timeout_secs)
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LogConfig {
    /// Level for the `cardbox` targets.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl Config {
    /// Loads defaults, then `path` if given, then the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder =
            config::Config::builder().add_source(config::Config::try_from(&Config::default())?);

        if let Some(path) = path {
            builder = builder.add_source(
                config::File::from(path)
                    .format(config::FileFormat::Yaml)
                    .required(true),
            );
        }

        let config: Config = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.check()?;
        Ok(config)
    }

    /// Checks value ranges.
    pub fn check(&self) -> Result<(), ConfigError> {
        self.validate()?;
        Ok(())
    }
}
