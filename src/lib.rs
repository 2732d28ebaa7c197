//! # Venafi Issuer
//!
//! Credential resolution and client initialisation for a cert-manager
//! Venafi issuer. An issuer names exactly one backend, Trust Protection
//! Platform (TPP) or Venafi Cloud; its credentials are read from a
//! namespaced secret store and handed to a connector factory.
//!
//! ## Architecture
//!
//! ```text
//! IssuerRegistry → VenafiIssuerFactory → ConfigResolver → SecretStore
//!                         ↓
//!                 ConnectorFactory → Connector
//! ```
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use venafi_issuer::connector::HttpConnectorFactory;
//! use venafi_issuer::domain::GenericIssuer;
//! use venafi_issuer::issuer::{
//!     ConfigResolver, IssuerDeps, IssuerOptions, IssuerRegistry, TracingEventSink,
//! };
//! use venafi_issuer::secrets::InMemorySecretStore;
//!
//! # async fn run(manifest: &str) -> venafi_issuer::Result<()> {
//! let registry =
//!     IssuerRegistry::with_default_issuers(IssuerOptions::default(), ConfigResolver::default())?;
//! let deps = IssuerDeps::new(
//!     Arc::new(InMemorySecretStore::new()),
//!     Arc::new(HttpConnectorFactory::default()),
//!     Arc::new(TracingEventSink),
//! );
//! let issuer = registry.build(&GenericIssuer::from_yaml(manifest)?, &deps).await?;
//! # let _ = issuer;
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod connector;
pub mod domain;
pub mod errors;
pub mod issuer;
pub mod observability;
pub mod secrets;

// Re-export commonly used types and traits
pub use config::AppConfig;
pub use errors::{IssuerError, Result};
pub use observability::init_logging;

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
