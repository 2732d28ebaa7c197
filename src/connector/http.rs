//! HTTP connector factory.
//!
//! Prepares the transport for a Venafi backend: a normalised base URL and a
//! `reqwest` client that trusts the issuer's CA bundle. No request is sent
//! while creating the connector.

use super::{Connector, ConnectorError, ConnectorFactory};
use crate::domain::{ClientConfig, ConnectorType, Credentials};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Base URL used for Cloud issuers that leave `url` empty
pub const DEFAULT_CLOUD_URL: &str = "https://api.venafi.cloud/";

/// Builds [`HttpConnector`]s.
#[derive(Debug, Clone)]
pub struct HttpConnectorFactory {
    timeout: Duration,
}

impl Default for HttpConnectorFactory {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

impl HttpConnectorFactory {
    /// Create a factory whose clients time out requests after `timeout`
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Parse the configured URL, defaulting the scheme to `https`.
    ///
    /// Cloud issuers may omit the URL; TPP issuers may not.
    pub fn normalize_url(connector_type: ConnectorType, raw: &str) -> Result<Url, ConnectorError> {
        let trimmed = raw.trim();
        let candidate = match (trimmed.is_empty(), connector_type) {
            (true, ConnectorType::Cloud) => DEFAULT_CLOUD_URL.to_string(),
            (true, ConnectorType::Tpp) => {
                return Err(ConnectorError::invalid_url(raw, "TPP URL is required"));
            }
            (false, _) if trimmed.contains("://") => trimmed.to_string(),
            (false, _) => format!("https://{trimmed}"),
        };

        let url = Url::parse(&candidate).map_err(|e| ConnectorError::invalid_url(raw, e.to_string()))?;
        match url.scheme() {
            "https" | "http" => {}
            other => {
                return Err(ConnectorError::invalid_url(raw, format!("unsupported scheme '{other}'")));
            }
        }
        if url.host_str().is_none() {
            return Err(ConnectorError::invalid_url(raw, "URL has no host"));
        }
        Ok(url)
    }

    fn build_client(&self, trust_bundle: &str) -> Result<reqwest::Client, ConnectorError> {
        let mut builder = reqwest::Client::builder().timeout(self.timeout);

        if !trust_bundle.is_empty() {
            let certificates = reqwest::Certificate::from_pem_bundle(trust_bundle.as_bytes())
                .map_err(|e| ConnectorError::invalid_trust_bundle(e.to_string()))?;
            if certificates.is_empty() {
                return Err(ConnectorError::invalid_trust_bundle("no PEM certificates found"));
            }
            debug!(certificates = certificates.len(), "Installing issuer trust bundle");
            for certificate in certificates {
                builder = builder.add_root_certificate(certificate);
            }
        }

        Ok(builder.build()?)
    }
}

#[async_trait]
impl ConnectorFactory for HttpConnectorFactory {
    async fn create(&self, config: ClientConfig) -> Result<Arc<dyn Connector>, ConnectorError> {
        let base_url = Self::normalize_url(config.connector_type, &config.base_url)?;
        let http = self.build_client(&config.trust_bundle)?;

        if config.verbose {
            debug!(
                connector_type = %config.connector_type,
                base_url = %base_url,
                zone = %config.zone,
                custom_trust = !config.trust_bundle.is_empty(),
                "Verbose logging requested for connector"
            );
        }
        info!(connector_type = %config.connector_type, base_url = %base_url, "Created Venafi connector");

        Ok(Arc::new(HttpConnector { base_url, http, config }))
    }
}

/// Connector holding the prepared HTTP transport and credentials.
#[derive(Debug, Clone)]
pub struct HttpConnector {
    base_url: Url,
    http: reqwest::Client,
    config: ClientConfig,
}

impl HttpConnector {
    /// Client configured with the backend's trust roots and timeout
    pub fn http_client(&self) -> &reqwest::Client {
        &self.http
    }

    pub fn url(&self) -> &Url {
        &self.base_url
    }

    pub fn credentials(&self) -> &Credentials {
        &self.config.credentials
    }

    pub fn verbose(&self) -> bool {
        self.config.verbose
    }
}

impl Connector for HttpConnector {
    fn connector_type(&self) -> ConnectorType {
        self.config.connector_type
    }

    fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    fn zone(&self) -> &str {
        &self.config.zone
    }
}
