//! Storage configuration loaded from environment variables with fallback to
//! defaults.
//!
//! | Variable                          | Default        |
//! |-----------------------------------|----------------|
//! | `LODGING_DATABASE_PATH`           | `./lodging.db` |
//! | `LODGING_DB_MAX_CONNECTIONS`      | `5`            |
//! | `LODGING_DB_MIN_CONNECTIONS`      | `1`            |
//! | `LODGING_DB_CONNECT_TIMEOUT_SECS` | `30`           |
//! | `LODGING_DB_RUN_MIGRATIONS`       | `true`         |

use std::collections::HashMap;
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::pool::DbConfig;

pub const DEFAULT_DATABASE_PATH: &str = "./lodging.db";

/// Storage configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub db: DbConfig,
}

impl StoreConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an explicit map (tests, embedding).
    pub fn from_map(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| vars.get(key).cloned())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let path = lookup("LODGING_DATABASE_PATH")
            .unwrap_or_else(|| DEFAULT_DATABASE_PATH.to_string());
        if path.trim().is_empty() {
            return Err(ConfigError::MissingRequired("LODGING_DATABASE_PATH".to_string()));
        }

        let max_connections: u32 = parse_or(&lookup, "LODGING_DB_MAX_CONNECTIONS", 5)?;
        let min_connections: u32 = parse_or(&lookup, "LODGING_DB_MIN_CONNECTIONS", 1)?;
        let connect_timeout_secs: u64 = parse_or(&lookup, "LODGING_DB_CONNECT_TIMEOUT_SECS", 30)?;
        let run_migrations: bool = parse_or(&lookup, "LODGING_DB_RUN_MIGRATIONS", true)?;

        if max_connections == 0 {
            return Err(ConfigError::InvalidValue("LODGING_DB_MAX_CONNECTIONS".to_string()));
        }
        if min_connections > max_connections {
            return Err(ConfigError::InvalidValue("LODGING_DB_MIN_CONNECTIONS".to_string()));
        }

        let base = if path == ":memory:" {
            DbConfig::in_memory()
        } else {
            DbConfig::new(path)
                .max_connections(max_connections)
                .min_connections(min_connections)
        };
        let db = base
            .connect_timeout(Duration::from_secs(connect_timeout_secs))
            .run_migrations(run_migrations);

        Ok(StoreConfig { db })
    }
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        None => Ok(default),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
