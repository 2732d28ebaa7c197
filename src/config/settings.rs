//! # Configuration Settings
//!
//! Defines the configuration structure for the issuer tooling.

use crate::errors::{IssuerError, Result};
use crate::issuer::{IssuerOptions, MissingKeyPolicy, DEFAULT_CLUSTER_RESOURCE_NAMESPACE};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use validator::Validate;

/// Prefix shared by every environment variable read here
pub const ENV_PREFIX: &str = "VENAFI_ISSUER_";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
pub struct AppConfig {
    /// Observability configuration
    #[validate(nested)]
    pub observability: ObservabilityConfig,

    /// Issuer initialisation settings
    #[validate(nested)]
    pub issuer: IssuerSettings,
}

impl AppConfig {
    /// Load configuration from `VENAFI_ISSUER_*` environment variables
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let config = Self {
            observability: ObservabilityConfig {
                service_name: env_or("SERVICE_NAME", defaults.observability.service_name),
                log_level: env_or("LOG_LEVEL", defaults.observability.log_level),
                json_logging: env_parse("JSON_LOGS", defaults.observability.json_logging)?,
            },
            issuer: IssuerSettings {
                cluster_resource_namespace: env_or(
                    "CLUSTER_RESOURCE_NAMESPACE",
                    defaults.issuer.cluster_resource_namespace,
                ),
                require_credential_keys: env_parse(
                    "REQUIRE_CREDENTIAL_KEYS",
                    defaults.issuer.require_credential_keys,
                )?,
                connector_timeout_seconds: env_parse(
                    "CONNECTOR_TIMEOUT_SECONDS",
                    defaults.issuer.connector_timeout_seconds,
                )?,
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        Validate::validate(self).map_err(IssuerError::from)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ObservabilityConfig {
    /// Service name attached to log output
    #[validate(length(min = 1, message = "Service name cannot be empty"))]
    pub service_name: String,

    /// Log level or filter directive (trace, debug, info, warn, error)
    #[validate(length(min = 1, message = "Log level cannot be empty"))]
    pub log_level: String,

    /// Enable JSON structured logging
    pub json_logging: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            service_name: "venafi-issuer".to_string(),
            log_level: "info".to_string(),
            json_logging: false,
        }
    }
}

/// Issuer initialisation settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct IssuerSettings {
    /// Namespace ClusterIssuer credentials are read from
    #[validate(length(min = 1, message = "Cluster resource namespace cannot be empty"))]
    pub cluster_resource_namespace: String,

    /// Fail resolution when a credentials secret lacks an expected key
    pub require_credential_keys: bool,

    /// Request timeout applied to connector HTTP clients
    #[validate(range(
        min = 1,
        max = 300,
        message = "Connector timeout must be between 1 and 300 seconds"
    ))]
    pub connector_timeout_seconds: u64,
}

impl Default for IssuerSettings {
    fn default() -> Self {
        Self {
            cluster_resource_namespace: DEFAULT_CLUSTER_RESOURCE_NAMESPACE.to_string(),
            require_credential_keys: false,
            connector_timeout_seconds: 30,
        }
    }
}

impl IssuerSettings {
    pub fn issuer_options(&self) -> IssuerOptions {
        IssuerOptions { cluster_resource_namespace: self.cluster_resource_namespace.clone() }
    }

    pub fn missing_key_policy(&self) -> MissingKeyPolicy {
        if self.require_credential_keys {
            MissingKeyPolicy::Reject
        } else {
            MissingKeyPolicy::Empty
        }
    }

    pub fn connector_timeout(&self) -> Duration {
        Duration::from_secs(self.connector_timeout_seconds)
    }
}

fn env_or(name: &str, default: String) -> String {
    std::env::var(format!("{ENV_PREFIX}{name}")).unwrap_or(default)
}

fn env_parse<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let var = format!("{ENV_PREFIX}{name}");
    match std::env::var(&var) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| IssuerError::configuration(format!("Invalid {}: {}", var, e))),
        Err(_) => Ok(default),
    }
}
