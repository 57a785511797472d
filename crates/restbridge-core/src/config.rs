//! Configuration management for RestBridge.
//!
//! All configuration is driven by environment variables. Library users that
//! embed the adapter directly can build a [`BridgeConfig`] with the typed
//! builder instead.

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use crate::error::{RestBridgeError, RestBridgeResult};

/// Global configuration for RestBridge.
///
/// # Examples
///
/// ```
/// use restbridge_core::BridgeConfig;
///
/// let config = BridgeConfig::default();
/// assert_eq!(config.gateway_listen, "0.0.0.0:4566");
/// assert_eq!(config.services, vec!["users".to_owned()]);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct BridgeConfig {
    /// Bind address for the local gateway (e.g. `"0.0.0.0:4566"`).
    #[builder(default = String::from("0.0.0.0:4566"))]
    pub gateway_listen: String,

    /// Log level filter string (e.g. `"info"`, `"debug"`).
    #[builder(default = String::from("info"))]
    pub log_level: String,

    /// Paths of the in-memory services registered by the server binary.
    #[builder(default = vec![String::from("users")])]
    pub services: Vec<String>,

    /// Name of the identifier field used by in-memory services.
    #[builder(default = String::from("id"))]
    pub id_field: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            gateway_listen: String::from("0.0.0.0:4566"),
            log_level: String::from("info"),
            services: vec![String::from("users")],
            id_field: String::from("id"),
        }
    }
}

impl BridgeConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `GATEWAY_LISTEN` | `0.0.0.0:4566` |
    /// | `LOG_LEVEL` | `info` |
    /// | `SERVICES` | `users` |
    /// | `ID_FIELD` | `id` |
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(v) = std::env::var("GATEWAY_LISTEN") {
            config.gateway_listen = v;
        }
        if let Ok(v) = std::env::var("LOG_LEVEL") {
            config.log_level = v;
        }
        if let Ok(v) = std::env::var("SERVICES") {
            let services = parse_services(&v);
            if !services.is_empty() {
                config.services = services;
            }
        }
        if let Ok(v) = std::env::var("ID_FIELD") {
            if !v.trim().is_empty() {
                config.id_field = v.trim().to_owned();
            }
        }

        config
    }

    /// Check that the configuration is usable by the server binary.
    pub fn validate(&self) -> RestBridgeResult<()> {
        if self.gateway_listen.trim().is_empty() {
            return Err(RestBridgeError::Config(
                "gateway listen address must not be empty".to_owned(),
            ));
        }
        if self.id_field.is_empty() {
            return Err(RestBridgeError::Config(
                "id field must not be empty".to_owned(),
            ));
        }
        if let Some(bad) = self
            .services
            .iter()
            .find(|s| s.is_empty() || s.starts_with('/') || s.ends_with('/'))
        {
            return Err(RestBridgeError::Config(format!(
                "invalid service path '{bad}': must be non-empty without leading or trailing '/'"
            )));
        }
        Ok(())
    }
}

/// Parse a comma-separated list of service paths.
fn parse_services(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}
