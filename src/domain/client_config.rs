//! Resolved client configuration handed to the connector factory.

use crate::secrets::SecretString;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Backend a connector talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConnectorType {
    Tpp,
    Cloud,
}

impl ConnectorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tpp => "TPP",
            Self::Cloud => "Cloud",
        }
    }
}

impl fmt::Display for ConnectorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Authentication material for a backend.
///
/// Secret fields redact themselves in Debug and serialized output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Credentials {
    UserPassword { user: String, password: SecretString },
    ApiKey { value: SecretString },
}

/// Fully resolved configuration for one connector.
///
/// Only ever constructed complete; the resolver returns an error instead of a
/// partially filled value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    pub connector_type: ConnectorType,
    pub base_url: String,
    pub zone: String,
    pub verbose: bool,
    /// PEM trust bundle for the backend; empty means system roots
    pub trust_bundle: String,
    pub credentials: Credentials,
}
