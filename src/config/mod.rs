//! Configuration module.
//!
//! The service is configured via a TOML file, with support for environment
//! variable interpolation using `${VAR_NAME}` syntax.
//!
//! # Example
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 8080
//!
//! [database]
//! path = "/var/lib/demandcast/demandcast.db"
//!
//! [forecasting.chronos]
//! endpoint = "${CHRONOS_ENDPOINT}"
//! ```

mod database;
mod forecasting;
mod observability;
mod server;

use std::path::Path;

pub use database::*;
pub use forecasting::*;
pub use observability::*;
use serde::{Deserialize, Serialize};
pub use server::*;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Root configuration. All sections are optional with sensible defaults,
/// allowing minimal configuration for simple deployments.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration for persistent storage.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Forecasting engine configuration.
    #[serde(default)]
    pub forecasting: ForecastingConfig,

    /// Observability configuration (logging).
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file, interpolating `${VAR}`
    /// references from the environment first.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let interpolated = interpolate_env(&raw);
        Ok(toml::from_str(&interpolated)?)
    }

    /// Default configuration rendered as TOML, for `demandcast init`.
    pub fn default_toml() -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(&Self::default())?)
    }
}

/// Replace `${VAR}` with the value of the environment variable `VAR`.
/// Unset variables are left as-is so parse errors point at the real gap.
fn interpolate_env(raw: &str) -> String {
    let mut result = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(start) = rest.find("${") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                let name = &after[..end];
                match std::env::var(name) {
                    Ok(value) => result.push_str(&value),
                    Err(_) => {
                        result.push_str("${");
                        result.push_str(name);
                        result.push('}');
                    }
                }
                rest = &after[end + 1..];
            }
            None => {
                result.push_str("${");
                rest = after;
            }
        }
    }
    result.push_str(rest);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.forecasting.min_history_days, 30);
        assert_eq!(config.database.max_connections, 5);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: Result<AppConfig, _> = toml::from_str("unknown_section = 1");
        assert!(result.is_err());
    }

    #[test]
    fn test_env_interpolation() {
        // Process env is shared across tests; use a unique name.
        unsafe { std::env::set_var("DEMANDCAST_TEST_ENDPOINT", "http://example:9000") };
        let raw = r#"
            [forecasting.chronos]
            endpoint = "${DEMANDCAST_TEST_ENDPOINT}/forecast"
        "#;
        let config: AppConfig = toml::from_str(&interpolate_env(raw)).unwrap();
        assert_eq!(
            config.forecasting.chronos.endpoint,
            "http://example:9000/forecast"
        );
    }

    #[test]
    fn test_unset_env_left_verbatim() {
        let raw = "value ${DEMANDCAST_DOES_NOT_EXIST} tail";
        assert_eq!(interpolate_env(raw), raw);
    }

    #[test]
    fn test_default_toml_round_trips() {
        let rendered = AppConfig::default_toml().unwrap();
        let parsed: AppConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed.server.port, AppConfig::default().server.port);
    }
}
