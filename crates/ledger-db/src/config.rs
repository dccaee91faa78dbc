//! Environment configuration for [`DbConfig`].
//!
//! | Variable                     | Default     |
//! |------------------------------|-------------|
//! | `LEDGER_DB_PATH`             | `ledger.db` |
//! | `LEDGER_DB_MAX_CONNECTIONS`  | `5`         |
//! | `LEDGER_STOCK_POLICY`        | `incremental` |

use std::env;

use ledger_core::StockPolicy;

use crate::pool::DbConfig;

pub const DB_PATH_VAR: &str = "LEDGER_DB_PATH";
pub const MAX_CONNECTIONS_VAR: &str = "LEDGER_DB_MAX_CONNECTIONS";
pub const STOCK_POLICY_VAR: &str = "LEDGER_STOCK_POLICY";

const DEFAULT_DB_PATH: &str = "ledger.db";

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {reason}")]
    InvalidValue { name: String, reason: String },

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

impl DbConfig {
    /// Loads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Loads configuration through `lookup`, which returns the value of a
    /// variable or `None` when unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let path = lookup(DB_PATH_VAR).unwrap_or_else(|| DEFAULT_DB_PATH.to_string());
        if path.trim().is_empty() {
            return Err(ConfigError::MissingRequired(DB_PATH_VAR.to_string()));
        }

        let mut config = DbConfig::new(path);

        if let Some(raw) = lookup(MAX_CONNECTIONS_VAR) {
            let max: u32 = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                name: MAX_CONNECTIONS_VAR.to_string(),
                reason: format!("'{}' is not a positive integer", raw),
            })?;
            if max == 0 {
                return Err(ConfigError::InvalidValue {
                    name: MAX_CONNECTIONS_VAR.to_string(),
                    reason: "must be at least 1".to_string(),
                });
            }
            let min = config.min_connections.min(max);
            config = config.max_connections(max).min_connections(min);
        }

        if let Some(raw) = lookup(STOCK_POLICY_VAR) {
            let policy: StockPolicy = raw.parse().map_err(|e: ledger_core::ValidationError| {
                ConfigError::InvalidValue {
                    name: STOCK_POLICY_VAR.to_string(),
                    reason: e.to_string(),
                }
            })?;
            config = config.stock_policy(policy);
        }

        Ok(config)
    }
}
