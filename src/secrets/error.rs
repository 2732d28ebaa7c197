//! Error types for secret store lookups.

use thiserror::Error;

/// Errors a [`SecretStore`](super::SecretStore) may return from a lookup.
#[derive(Error, Debug)]
pub enum SecretStoreError {
    /// The secret does not exist in the requested namespace.
    #[error("secret \"{namespace}/{name}\" not found")]
    NotFound { namespace: String, name: String },

    /// The store could not answer (unreachable, unauthorised, malformed data).
    #[error("secret store backend error: {message}")]
    Backend { message: String },
}

impl SecretStoreError {
    /// Create a not found error.
    pub fn not_found(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self::NotFound { namespace: namespace.into(), name: name.into() }
    }

    /// Create a backend error.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend { message: message.into() }
    }

    /// Whether this error means the secret is absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
