//! Domain layer
//!
//! Issuer resources as consumed from manifests and the client configuration
//! produced from them. No I/O happens here.

pub mod client_config;
pub mod issuer;

pub use client_config::{ClientConfig, ConnectorType, Credentials};
pub use issuer::{
    CloudConfig, GenericIssuer, GenericIssuerSpec, IssuerKind, IssuerMeta, IssuerSpec, IssuerType,
    ObjectRef, SecretRef, TppConfig, VenafiBackend, DEFAULT_API_KEY_KEY, TPP_PASSWORD_KEY,
    TPP_USERNAME_KEY,
};
