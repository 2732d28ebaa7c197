//! Issuer resource types
//!
//! Mirrors the `Issuer` / `ClusterIssuer` manifests consumed by the
//! controller. Only the `venafi` block is modelled in full; the other issuer
//! blocks are carried opaquely so the issuer type can still be detected.

use crate::errors::{IssuerError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default key holding the API key in a Cloud credentials secret
pub const DEFAULT_API_KEY_KEY: &str = "api-key";

/// Fixed key holding the TPP user name
pub const TPP_USERNAME_KEY: &str = "username";

/// Fixed key holding the TPP password
pub const TPP_PASSWORD_KEY: &str = "password";

/// Issuer implementations known to the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IssuerType {
    Acme,
    Ca,
    SelfSigned,
    Vault,
    Venafi,
}

impl IssuerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Acme => "acme",
            Self::Ca => "ca",
            Self::SelfSigned => "selfsigned",
            Self::Vault => "vault",
            Self::Venafi => "venafi",
        }
    }
}

impl FromStr for IssuerType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "acme" => Ok(Self::Acme),
            "ca" => Ok(Self::Ca),
            "selfsigned" => Ok(Self::SelfSigned),
            "vault" => Ok(Self::Vault),
            "venafi" => Ok(Self::Venafi),
            _ => Err(format!("Unknown issuer type: {}", s)),
        }
    }
}

impl fmt::Display for IssuerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Namespaced `Issuer` or cluster-scoped `ClusterIssuer`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IssuerKind {
    Issuer,
    ClusterIssuer,
}

impl fmt::Display for IssuerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Issuer => write!(f, "Issuer"),
            Self::ClusterIssuer => write!(f, "ClusterIssuer"),
        }
    }
}

/// Object metadata relevant to issuer initialisation
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct IssuerMeta {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

/// An `Issuer` or `ClusterIssuer` resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenericIssuer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    pub kind: IssuerKind,
    pub metadata: IssuerMeta,
    pub spec: GenericIssuerSpec,
}

impl GenericIssuer {
    /// Reference used when recording events against this issuer
    pub fn object_ref(&self) -> ObjectRef {
        ObjectRef {
            kind: self.kind,
            namespace: self.metadata.namespace.clone(),
            name: self.metadata.name.clone(),
        }
    }

    /// Load an issuer from a YAML (or JSON) manifest
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| IssuerError::serialization("invalid issuer manifest", e))
    }
}

/// The issuer-type blocks of an issuer spec; exactly one should be set.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenericIssuerSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acme: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub self_signed: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vault: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venafi: Option<IssuerSpec>,
}

impl GenericIssuerSpec {
    /// Detect which issuer implementation this spec selects
    pub fn issuer_type(&self) -> Result<IssuerType> {
        let set: Vec<IssuerType> = [
            (self.acme.is_some(), IssuerType::Acme),
            (self.ca.is_some(), IssuerType::Ca),
            (self.self_signed.is_some(), IssuerType::SelfSigned),
            (self.vault.is_some(), IssuerType::Vault),
            (self.venafi.is_some(), IssuerType::Venafi),
        ]
        .into_iter()
        .filter_map(|(present, issuer_type)| present.then_some(issuer_type))
        .collect();

        match set.as_slice() {
            [issuer_type] => Ok(*issuer_type),
            [] => Err(IssuerError::configuration("no issuer type specified")),
            many => Err(IssuerError::configuration(format!(
                "multiple issuer types specified: {}",
                many.iter().map(IssuerType::as_str).collect::<Vec<_>>().join(", ")
            ))),
        }
    }
}

/// The `venafi` block of an issuer
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IssuerSpec {
    /// Policy zone requests are routed to
    #[serde(default)]
    pub zone: String,

    /// Ask the connector for verbose logging
    #[serde(default)]
    pub verbose: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tpp: Option<TppConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud: Option<CloudConfig>,
}

impl IssuerSpec {
    /// The populated backend variant.
    ///
    /// Fails with a configuration error when neither or both of the TPP and
    /// Cloud blocks are set.
    pub fn backend(&self) -> Result<VenafiBackend<'_>> {
        match (&self.tpp, &self.cloud) {
            (Some(tpp), None) => Ok(VenafiBackend::Tpp(tpp)),
            (None, Some(cloud)) => Ok(VenafiBackend::Cloud(cloud)),
            (None, None) => Err(IssuerError::configuration("neither Cloud nor TPP configuration found")),
            (Some(_), Some(_)) => Err(IssuerError::configuration("both Cloud and TPP configuration found")),
        }
    }
}

/// Borrowed view of the selected backend block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VenafiBackend<'a> {
    Tpp(&'a TppConfig),
    Cloud(&'a CloudConfig),
}

/// On-premises Trust Protection Platform settings
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TppConfig {
    pub url: String,

    /// Secret holding `username` and `password`
    pub credentials_ref: SecretRef,

    /// PEM bundle trusted for the TPP endpoint; empty means system roots
    #[serde(default, with = "base64_bytes", skip_serializing_if = "Vec::is_empty")]
    pub ca_bundle: Vec<u8>,
}

/// Hosted Venafi Cloud settings
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudConfig {
    #[serde(default)]
    pub url: String,

    /// Secret holding the API key
    pub api_key_secret_ref: SecretRef,
}

/// Pointer to a secret and, optionally, a key inside it
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SecretRef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

impl SecretRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), key: None }
    }

    pub fn with_key(name: impl Into<String>, key: impl Into<String>) -> Self {
        Self { name: name.into(), key: Some(key.into()) }
    }

    /// The referenced key, or `default` when unset or empty
    pub fn key_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.key.as_deref().filter(|k| !k.is_empty()).unwrap_or(default)
    }
}

/// Identifies the object an event is recorded against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRef {
    pub kind: IssuerKind,
    pub namespace: Option<String>,
    pub name: String,
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{}/{}/{}", self.kind, ns, self.name),
            None => write!(f, "{}/{}", self.kind, self.name),
        }
    }
}

mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
        STANDARD.decode(encoded.trim()).map_err(serde::de::Error::custom)
    }
}
