//! # Configuration Management
//!
//! Environment-driven configuration for the issuer tooling. Every variable
//! is prefixed with `VENAFI_ISSUER_`; unset variables fall back to defaults.

pub mod settings;

pub use settings::{AppConfig, IssuerSettings, ObservabilityConfig, ENV_PREFIX};
