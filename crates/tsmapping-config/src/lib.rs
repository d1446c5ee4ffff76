//! TOML configuration for tsmapping.
//!
//! Every section and field is optional; missing values fall back to the
//! defaults below and unknown keys are rejected.

use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use thiserror::Error as ThisError;

pub use tsmapping_schema::validate::ValidationStrategy;

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

///
/// Config
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub index: IndexConfig,
    pub validation: ValidationConfig,
    pub bulk: BulkConfig,
    pub log: LogConfig,
}

impl Config {
    /// Load and check a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.check()?;

        Ok(config)
    }

    // check
    fn check(&self) -> Result<(), ConfigError> {
        if self.index.number_of_shards == 0 {
            return Err(ConfigError::Invalid(
                "index.number_of_shards must be >= 1".to_string(),
            ));
        }
        if self.bulk.max_actions == 0 {
            return Err(ConfigError::Invalid(
                "bulk.max_actions must be >= 1".to_string(),
            ));
        }

        Ok(())
    }
}

///
/// IndexConfig
/// Defaults applied to create-index requests that leave them out.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct IndexConfig {
    pub number_of_shards: u32,
    pub date_detection: bool,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            number_of_shards: 1,
            date_detection: true,
        }
    }
}

///
/// ValidationConfig
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidationConfig {
    pub strategy: ValidationStrategy,
}

///
/// BulkConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct BulkConfig {
    /// Validate the documents of one request on the rayon pool.
    pub parallel: bool,

    /// Largest number of actions accepted in one request.
    pub max_actions: usize,
}

impl Default for BulkConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            max_actions: 10_000,
        }
    }
}

///
/// LogConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}
