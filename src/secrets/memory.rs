//! In-memory secret store.
//!
//! Backs the CLI (secrets loaded from Kubernetes `Secret` manifests) and the
//! test suites. Readers never block each other.

use super::error::SecretStoreError;
use super::store::{SecretData, SecretStore};
use crate::errors::{IssuerError, Result};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;
use tracing::debug;

type SecretKey = (String, String);

/// Secret store holding secrets in a process-local map.
#[derive(Debug, Default)]
pub struct InMemorySecretStore {
    inner: RwLock<HashMap<SecretKey, SecretData>>,
    lookups: AtomicUsize,
}

impl InMemorySecretStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert used while assembling a store
    pub fn with_secret<I, K, V>(mut self, namespace: &str, name: &str, data: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Vec<u8>>,
    {
        let data = data.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        self.inner.get_mut().insert((namespace.to_string(), name.to_string()), data);
        self
    }

    /// Insert or replace a secret
    pub async fn insert(&self, namespace: &str, name: &str, data: SecretData) {
        self.inner.write().await.insert((namespace.to_string(), name.to_string()), data);
    }

    /// Remove a secret, returning its data if it existed
    pub async fn remove(&self, namespace: &str, name: &str) -> Option<SecretData> {
        self.inner.write().await.remove(&(namespace.to_string(), name.to_string()))
    }

    /// Number of secrets held
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Whether the store holds no secrets
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    /// Number of `get` calls served so far, hits and misses alike
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::Relaxed)
    }

    /// Load secrets from multi-document YAML of `v1/Secret` manifests.
    ///
    /// `data` values are base64 decoded, `stringData` values are taken
    /// verbatim and win over `data` for the same key. Manifests without a
    /// namespace land in `default_namespace`.
    pub fn from_manifests(yaml: &str, default_namespace: &str) -> Result<Self> {
        let mut store = Self::new();

        for (index, document) in serde_yaml::Deserializer::from_str(yaml).enumerate() {
            let manifest = Option::<SecretManifest>::deserialize(document).map_err(|e| {
                IssuerError::serialization(format!("invalid secret manifest #{}", index + 1), e)
            })?;
            let Some(manifest) = manifest else {
                continue;
            };

            if let Some(kind) = manifest.kind.as_deref() {
                if kind != "Secret" {
                    return Err(IssuerError::configuration(format!(
                        "manifest #{} has kind '{}', expected 'Secret'",
                        index + 1,
                        kind
                    )));
                }
            }

            let namespace =
                manifest.metadata.namespace.clone().unwrap_or_else(|| default_namespace.to_string());
            let name = manifest.metadata.name;

            let mut data = SecretData::new();
            for (key, encoded) in manifest.data {
                let decoded = STANDARD.decode(encoded.trim()).map_err(|e| {
                    IssuerError::configuration_with_source(
                        format!("secret '{}/{}' key '{}' is not valid base64", namespace, name, key),
                        Box::new(e),
                    )
                })?;
                data.insert(key, decoded);
            }
            for (key, value) in manifest.string_data {
                data.insert(key, value.into_bytes());
            }

            debug!(namespace = %namespace, secret = %name, keys = data.len(), "Loaded secret manifest");
            store.inner.get_mut().insert((namespace, name), data);
        }

        Ok(store)
    }

    /// Load secrets from a manifest file; see [`Self::from_manifests`].
    pub fn from_manifest_file(path: impl AsRef<Path>, default_namespace: &str) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| IssuerError::io(format!("failed to read {}", path.display()), e))?;
        Self::from_manifests(&content, default_namespace)
    }
}

#[async_trait]
impl SecretStore for InMemorySecretStore {
    async fn get(&self, namespace: &str, name: &str) -> std::result::Result<SecretData, SecretStoreError> {
        self.lookups.fetch_add(1, Ordering::Relaxed);

        self.inner
            .read()
            .await
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| SecretStoreError::not_found(namespace, name))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SecretManifest {
    #[serde(default)]
    kind: Option<String>,
    metadata: ManifestMeta,
    #[serde(default)]
    data: BTreeMap<String, String>,
    #[serde(default)]
    string_data: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct ManifestMeta {
    name: String,
    #[serde(default)]
    namespace: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_returns_inserted_secret() {
        let store = InMemorySecretStore::new()
            .with_secret("cert-manager", "tpp-creds", [("username", "alice"), ("password", "s3cr3t")]);

        let data = store.get("cert-manager", "tpp-creds").await.unwrap();
        assert_eq!(data.get("username").map(Vec::as_slice), Some(&b"alice"[..]));
        assert_eq!(data.get("password").map(Vec::as_slice), Some(&b"s3cr3t"[..]));
        assert_eq!(store.lookups(), 1);
    }

    #[tokio::test]
    async fn test_get_is_namespaced() {
        let store = InMemorySecretStore::new().with_secret("team-a", "cloud-key", [("api-key", "XYZ")]);

        let err = store.get("team-b", "cloud-key").await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(store.lookups(), 1);
    }

    #[tokio::test]
    async fn test_insert_and_remove() {
        let store = InMemorySecretStore::new();
        assert!(store.is_empty().await);

        let mut data = SecretData::new();
        data.insert("token".to_string(), b"ABC789".to_vec());
        store.insert("ns", "cloud-key", data).await;
        assert_eq!(store.len().await, 1);

        assert!(store.remove("ns", "cloud-key").await.is_some());
        assert!(store.get("ns", "cloud-key").await.is_err());
    }

    #[tokio::test]
    async fn test_from_manifests_decodes_data_and_string_data() {
        let yaml = r#"
apiVersion: v1
kind: Secret
metadata:
  name: tpp-creds
  namespace: cert-manager
data:
  username: YWxpY2U=
  password: czNjcjN0
---
apiVersion: v1
kind: Secret
metadata:
  name: cloud-key
stringData:
  api-key: XYZ123
data:
  api-key: aWdub3JlZA==
---
"#;
        let store = InMemorySecretStore::from_manifests(yaml, "default").unwrap();
        assert_eq!(store.len().await, 2);

        let tpp = store.get("cert-manager", "tpp-creds").await.unwrap();
        assert_eq!(tpp["username"], b"alice");
        assert_eq!(tpp["password"], b"s3cr3t");

        let cloud = store.get("default", "cloud-key").await.unwrap();
        assert_eq!(cloud["api-key"], b"XYZ123");
    }

    #[test]
    fn test_from_manifests_rejects_other_kinds() {
        let yaml = "kind: ConfigMap\nmetadata:\n  name: not-a-secret\n";
        let err = InMemorySecretStore::from_manifests(yaml, "default").unwrap_err();
        assert!(matches!(err, IssuerError::Configuration { .. }));
        assert!(err.to_string().contains("ConfigMap"));
    }

    #[test]
    fn test_from_manifests_rejects_bad_base64() {
        let yaml = "kind: Secret\nmetadata:\n  name: broken\ndata:\n  password: '***'\n";
        let err = InMemorySecretStore::from_manifests(yaml, "default").unwrap_err();
        assert!(err.to_string().contains("not valid base64"));
    }

    #[test]
    fn test_from_manifest_file_missing() {
        let err = InMemorySecretStore::from_manifest_file("/nonexistent/secrets.yaml", "default")
            .unwrap_err();
        assert!(matches!(err, IssuerError::Io { .. }));
    }
}
