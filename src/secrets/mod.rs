//! Secret store capability and implementations.
//!
//! The resolver only ever reads secrets through the [`SecretStore`] trait:
//! a namespaced, read-only `get(namespace, name)` returning the secret's raw
//! key/value bytes. Storage, replication and caching are the store's concern.
//!
//! # Implementations
//!
//! - [`InMemorySecretStore`]: process-local map, loadable from `v1/Secret`
//!   manifests. Used by the CLI and the tests.
//! - `KubeSecretStore`: reads Secrets from the API server (`kube` feature).
//!
//! Credential values taken out of a secret are wrapped in [`SecretString`]
//! so they never reach logs or printed output.

pub mod error;
#[cfg(feature = "kube")]
pub mod kube;
pub mod memory;
pub mod store;
pub mod types;

pub use error::SecretStoreError;
#[cfg(feature = "kube")]
pub use self::kube::KubeSecretStore;
pub use memory::InMemorySecretStore;
pub use store::{SecretData, SecretStore};
pub use types::SecretString;
