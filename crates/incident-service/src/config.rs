//! Service configuration.
//!
//! Configuration is loaded from environment variables with defaults
//! suitable for local development.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid configuration value.
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue {
        /// Configuration key.
        key: String,
        /// Error message.
        message: String,
    },
}

/// Tracker service configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Audit log page size when the request names none.
    pub audit_default_limit: usize,

    /// Largest audit log page a request may ask for.
    pub audit_max_limit: usize,

    /// Capacity of the live audit feed.
    pub audit_channel_capacity: usize,

    /// Whether to start with the demo accounts and reason catalog.
    pub seed_demo_data: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            audit_default_limit: 100,
            audit_max_limit: 1000,
            audit_channel_capacity: 1024,
            seed_demo_data: true,
        }
    }
}

impl ServiceConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `INCIDENT_AUDIT_DEFAULT_LIMIT`: Default audit page size (default: 100)
    /// - `INCIDENT_AUDIT_MAX_LIMIT`: Maximum audit page size (default: 1000)
    /// - `INCIDENT_AUDIT_CHANNEL_CAPACITY`: Live audit feed capacity (default: 1024)
    /// - `INCIDENT_SEED_DEMO_DATA`: Seed demo accounts and reasons (default: true)
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for a value that does not parse
    /// or fails [`ServiceConfig::validate`].
    pub fn from_env() -> Result<Self, ConfigError> {
        let default = Self::default();

        let config = Self {
            audit_default_limit: parse_value(
                "INCIDENT_AUDIT_DEFAULT_LIMIT",
                std::env::var("INCIDENT_AUDIT_DEFAULT_LIMIT").ok().as_deref(),
                default.audit_default_limit,
            )?,
            audit_max_limit: parse_value(
                "INCIDENT_AUDIT_MAX_LIMIT",
                std::env::var("INCIDENT_AUDIT_MAX_LIMIT").ok().as_deref(),
                default.audit_max_limit,
            )?,
            audit_channel_capacity: parse_value(
                "INCIDENT_AUDIT_CHANNEL_CAPACITY",
                std::env::var("INCIDENT_AUDIT_CHANNEL_CAPACITY").ok().as_deref(),
                default.audit_channel_capacity,
            )?,
            seed_demo_data: std::env::var("INCIDENT_SEED_DEMO_DATA")
                .map(|s| s != "false" && s != "0")
                .unwrap_or(default.seed_demo_data),
        };

        config.validate()?;
        Ok(config)
    }

    /// Check that the limits are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.audit_default_limit == 0 {
            return Err(ConfigError::InvalidValue {
                key: "INCIDENT_AUDIT_DEFAULT_LIMIT".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        if self.audit_max_limit == 0 {
            return Err(ConfigError::InvalidValue {
                key: "INCIDENT_AUDIT_MAX_LIMIT".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        if self.audit_default_limit > self.audit_max_limit {
            return Err(ConfigError::InvalidValue {
                key: "INCIDENT_AUDIT_DEFAULT_LIMIT".to_string(),
                message: format!("must not exceed the maximum of {}", self.audit_max_limit),
            });
        }
        if self.audit_channel_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                key: "INCIDENT_AUDIT_CHANNEL_CAPACITY".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// Clamp a requested audit page size, falling back to the default.
    pub fn audit_limit(&self, requested: Option<usize>) -> usize {
        requested
            .filter(|limit| *limit > 0)
            .unwrap_or(self.audit_default_limit)
            .min(self.audit_max_limit)
    }
}

/// Parse an optional raw value, keeping the default when it is unset.
fn parse_value<T>(key: &str, raw: Option<&str>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("{:?}: {}", value, e),
        }),
    }
}
