//! Kubernetes secret store.
//!
//! Reads `core/v1` Secrets through the API server. Only compiled with the
//! `kube` feature.

use super::error::SecretStoreError;
use super::store::{SecretData, SecretStore};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use kube::{Api, Client};
use tracing::debug;

/// Secret store backed by the Kubernetes API.
#[derive(Clone)]
pub struct KubeSecretStore {
    client: Client,
}

impl std::fmt::Debug for KubeSecretStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeSecretStore").finish_non_exhaustive()
    }
}

impl KubeSecretStore {
    /// Create a store from an existing client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Create a store from the ambient kubeconfig or in-cluster service account
    pub async fn try_default() -> Result<Self, SecretStoreError> {
        let client = Client::try_default()
            .await
            .map_err(|e| SecretStoreError::backend(format!("failed to create kube client: {e}")))?;
        Ok(Self::new(client))
    }
}

#[async_trait]
impl SecretStore for KubeSecretStore {
    async fn get(&self, namespace: &str, name: &str) -> Result<SecretData, SecretStoreError> {
        let api: Api<Secret> = Api::namespaced(self.client.clone(), namespace);

        let secret = api
            .get_opt(name)
            .await
            .map_err(|e| SecretStoreError::backend(format!("failed to get secret {namespace}/{name}: {e}")))?
            .ok_or_else(|| SecretStoreError::not_found(namespace, name))?;

        let data: SecretData = secret
            .data
            .unwrap_or_default()
            .into_iter()
            .map(|(key, value)| (key, value.0))
            .collect();

        debug!(namespace = %namespace, secret = %name, keys = data.len(), "Fetched secret from Kubernetes");
        Ok(data)
    }
}
