//! # Error Types
//!
//! Error taxonomy for issuer initialisation using `thiserror`.

use crate::connector::ConnectorError;
use crate::domain::{ConnectorType, IssuerType};
use crate::secrets::SecretStoreError;

/// Custom result type for issuer operations
pub type Result<T> = std::result::Result<T, IssuerError>;

/// Main error type for issuer resolution and initialisation
#[derive(thiserror::Error, Debug)]
pub enum IssuerError {
    /// The issuer or the process configuration is unusable as written.
    /// Not retryable: the resource or settings must be fixed.
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The referenced credentials secret could not be loaded.
    /// Not-found and backend failures surface identically.
    #[error("error loading {backend} credentials: {source}")]
    SecretLookup {
        backend: ConnectorType,
        #[source]
        source: SecretStoreError,
    },

    /// A credentials secret lacks a required key (strict key policy only).
    #[error("secret '{namespace}/{secret}' has no value for key '{key}'")]
    MissingCredential {
        namespace: String,
        secret: String,
        key: String,
    },

    /// The connector factory rejected the resolved client configuration.
    #[error("error creating Venafi client: {source}")]
    ConnectorCreation {
        #[source]
        source: ConnectorError,
    },

    /// No factory has been registered for the issuer type.
    #[error("issuer type '{0}' is not registered")]
    UnregisteredIssuerType(IssuerType),

    /// I/O errors with additional context
    #[error("I/O error: {context}")]
    Io {
        #[source]
        source: std::io::Error,
        context: String,
    },

    /// Manifest decoding errors
    #[error("Serialization error: {context}")]
    Serialization {
        #[source]
        source: serde_yaml::Error,
        context: String,
    },
}

impl IssuerError {
    /// Create a new configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
            source: None,
        }
    }

    /// Create a configuration error with source
    pub fn configuration_with_source<S: Into<String>>(
        message: S,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::Configuration {
            message: message.into(),
            source: Some(source),
        }
    }

    /// Wrap a secret store failure for the given backend variant
    pub fn secret_lookup(backend: ConnectorType, source: SecretStoreError) -> Self {
        Self::SecretLookup { backend, source }
    }

    /// Create a missing credential error
    pub fn missing_credential<N, S, K>(namespace: N, secret: S, key: K) -> Self
    where
        N: Into<String>,
        S: Into<String>,
        K: Into<String>,
    {
        Self::MissingCredential {
            namespace: namespace.into(),
            secret: secret.into(),
            key: key.into(),
        }
    }

    /// Wrap a connector factory failure
    pub fn connector_creation(source: ConnectorError) -> Self {
        Self::ConnectorCreation { source }
    }

    /// Create an I/O error with context
    pub fn io<S: Into<String>>(context: S, source: std::io::Error) -> Self {
        Self::Io {
            source,
            context: context.into(),
        }
    }

    /// Create a manifest decoding error with context
    pub fn serialization<S: Into<String>>(context: S, source: serde_yaml::Error) -> Self {
        Self::Serialization {
            source,
            context: context.into(),
        }
    }

    /// Whether the caller may reasonably retry the operation later.
    ///
    /// Resolution itself reports absent and unreachable secrets the same
    /// way; this is for callers that schedule retries. Only secret store
    /// backend failures are transient.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            IssuerError::SecretLookup {
                source: SecretStoreError::Backend { .. },
                ..
            }
        )
    }
}

impl From<validator::ValidationErrors> for IssuerError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields = Vec::new();
        collect_validation_messages("", &errors, &mut fields);
        fields.sort();

        Self::configuration(format!("Validation failed: {}", fields.join("; ")))
    }
}

/// Flattens nested validation errors into `path: message` entries
fn collect_validation_messages(prefix: &str, errors: &validator::ValidationErrors, out: &mut Vec<String>) {
    use validator::ValidationErrorsKind;

    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() { field.to_string() } else { format!("{}.{}", prefix, field) };
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                let messages: Vec<String> = field_errors
                    .iter()
                    .map(|e| e.message.as_ref().map_or("Invalid value".to_string(), |m| m.to_string()))
                    .collect();
                out.push(format!("{}: {}", path, messages.join(", ")));
            }
            ValidationErrorsKind::Struct(nested) => collect_validation_messages(&path, nested, out),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect_validation_messages(&format!("{}[{}]", path, index), nested, out);
                }
            }
        }
    }
}
