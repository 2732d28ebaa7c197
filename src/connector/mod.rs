//! Connector factory capability.
//!
//! A connector is the live client for one Venafi backend. The certificate
//! protocol it speaks is outside this crate; what lives here is the seam the
//! issuer factory calls with a resolved [`ClientConfig`], plus an HTTP-based
//! factory that prepares the transport for a backend.
//!
//! # Available Factories
//!
//! - [`HttpConnectorFactory`]: builds a `reqwest` client with the backend's
//!   base URL, trust bundle and request timeout.

pub mod http;

pub use http::{HttpConnector, HttpConnectorFactory, DEFAULT_CLOUD_URL};

use crate::domain::{ClientConfig, ConnectorType};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while creating a connector.
#[derive(Error, Debug)]
pub enum ConnectorError {
    /// The backend URL is missing or unusable.
    #[error("invalid base URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The configured trust bundle holds no usable certificates.
    #[error("invalid trust bundle: {reason}")]
    InvalidTrustBundle { reason: String },

    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    /// Failure reported by another connector implementation.
    #[error("{message}")]
    Backend { message: String },
}

impl ConnectorError {
    pub fn invalid_url(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into(), reason: reason.into() }
    }

    pub fn invalid_trust_bundle(reason: impl Into<String>) -> Self {
        Self::InvalidTrustBundle { reason: reason.into() }
    }

    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend { message: message.into() }
    }
}

/// A live client bound to one backend.
pub trait Connector: Send + Sync + std::fmt::Debug {
    /// Backend variant this connector talks to
    fn connector_type(&self) -> ConnectorType;

    /// Normalised backend URL
    fn base_url(&self) -> &str;

    /// Policy zone requests are issued against
    fn zone(&self) -> &str;
}

/// Produces connectors from resolved client configurations.
///
/// Implementations must be Send + Sync for use in async contexts.
#[async_trait]
pub trait ConnectorFactory: Send + Sync + std::fmt::Debug {
    /// Create a connector for `config`.
    ///
    /// The config is consumed: it is built fresh for each call and does not
    /// outlive connector creation except inside the connector itself.
    async fn create(&self, config: ClientConfig) -> Result<Arc<dyn Connector>, ConnectorError>;
}
