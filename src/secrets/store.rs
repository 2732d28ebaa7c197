//! Secret store capability.
//!
//! Defines the read-only lookup interface the resolver consumes.

use super::error::SecretStoreError;
use async_trait::async_trait;
use std::collections::BTreeMap;

/// Raw contents of a secret: key to byte value.
pub type SecretData = BTreeMap<String, Vec<u8>>;

/// Read-only access to namespaced secrets.
///
/// Implementations must be Send + Sync; lookups may block on I/O and are
/// expected to be safe for concurrent readers.
#[async_trait]
pub trait SecretStore: Send + Sync + std::fmt::Debug {
    /// Fetch the data of secret `name` in `namespace`.
    ///
    /// Returns [`SecretStoreError::NotFound`] when the secret is absent and
    /// [`SecretStoreError::Backend`] for any other failure.
    async fn get(&self, namespace: &str, name: &str) -> Result<SecretData, SecretStoreError>;
}
