//! Venafi client configuration resolver
//!
//! Turns the `venafi` block of an issuer into a [`ClientConfig`], pulling the
//! referenced credentials out of the secret store. Pure apart from the single
//! read-only secret lookup; nothing is cached between calls.

use crate::domain::{
    ClientConfig, CloudConfig, ConnectorType, Credentials, IssuerSpec, TppConfig, VenafiBackend,
    DEFAULT_API_KEY_KEY, TPP_PASSWORD_KEY, TPP_USERNAME_KEY,
};
use crate::errors::{IssuerError, Result};
use crate::secrets::{SecretData, SecretStore, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// What to do when a credentials secret lacks an expected key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingKeyPolicy {
    /// Substitute an empty value and let the backend reject the credentials.
    #[default]
    Empty,
    /// Fail resolution with [`IssuerError::MissingCredential`]. Empty values
    /// count as missing.
    Reject,
}

/// Resolves issuer specs into client configurations.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigResolver {
    missing_keys: MissingKeyPolicy,
}

impl ConfigResolver {
    pub fn new(missing_keys: MissingKeyPolicy) -> Self {
        Self { missing_keys }
    }

    pub fn missing_key_policy(&self) -> MissingKeyPolicy {
        self.missing_keys
    }

    /// Resolve `spec` using secrets from `namespace`.
    pub async fn resolve(
        &self,
        namespace: &str,
        spec: &IssuerSpec,
        store: &dyn SecretStore,
    ) -> Result<ClientConfig> {
        match spec.backend()? {
            VenafiBackend::Tpp(tpp) => self.resolve_tpp(namespace, spec, tpp, store).await,
            VenafiBackend::Cloud(cloud) => self.resolve_cloud(namespace, spec, cloud, store).await,
        }
    }

    async fn resolve_tpp(
        &self,
        namespace: &str,
        spec: &IssuerSpec,
        tpp: &TppConfig,
        store: &dyn SecretStore,
    ) -> Result<ClientConfig> {
        let secret_name = &tpp.credentials_ref.name;
        let data = store
            .get(namespace, secret_name)
            .await
            .map_err(|e| IssuerError::secret_lookup(ConnectorType::Tpp, e))?;

        let user = self.read_key(namespace, secret_name, &data, TPP_USERNAME_KEY)?;
        let password = self.read_key(namespace, secret_name, &data, TPP_PASSWORD_KEY)?;

        let trust_bundle = if tpp.ca_bundle.is_empty() {
            String::new()
        } else {
            String::from_utf8_lossy(&tpp.ca_bundle).into_owned()
        };

        debug!(
            namespace = %namespace,
            secret = %secret_name,
            custom_trust = !trust_bundle.is_empty(),
            "Resolved TPP client configuration"
        );

        Ok(ClientConfig {
            connector_type: ConnectorType::Tpp,
            base_url: tpp.url.clone(),
            zone: spec.zone.clone(),
            verbose: spec.verbose,
            trust_bundle,
            credentials: Credentials::UserPassword {
                user: user.expose_secret().to_string(),
                password,
            },
        })
    }

    async fn resolve_cloud(
        &self,
        namespace: &str,
        spec: &IssuerSpec,
        cloud: &CloudConfig,
        store: &dyn SecretStore,
    ) -> Result<ClientConfig> {
        let secret_ref = &cloud.api_key_secret_ref;
        let data = store
            .get(namespace, &secret_ref.name)
            .await
            .map_err(|e| IssuerError::secret_lookup(ConnectorType::Cloud, e))?;

        let key = secret_ref.key_or(DEFAULT_API_KEY_KEY);
        let api_key = self.read_key(namespace, &secret_ref.name, &data, key)?;

        debug!(
            namespace = %namespace,
            secret = %secret_ref.name,
            key = %key,
            "Resolved Cloud client configuration"
        );

        Ok(ClientConfig {
            connector_type: ConnectorType::Cloud,
            base_url: cloud.url.clone(),
            zone: spec.zone.clone(),
            verbose: spec.verbose,
            trust_bundle: String::new(),
            credentials: Credentials::ApiKey { value: api_key },
        })
    }

    fn read_key(
        &self,
        namespace: &str,
        secret: &str,
        data: &SecretData,
        key: &str,
    ) -> Result<SecretString> {
        let value = data.get(key).map(Vec::as_slice).unwrap_or_default();
        if !value.is_empty() {
            return Ok(SecretString::from_bytes(value));
        }

        match self.missing_keys {
            MissingKeyPolicy::Empty => {
                if !data.contains_key(key) {
                    warn!(
                        namespace = %namespace,
                        secret = %secret,
                        key = %key,
                        "Credentials secret has no value for key, using empty value"
                    );
                }
                Ok(SecretString::default())
            }
            MissingKeyPolicy::Reject => Err(IssuerError::missing_credential(namespace, secret, key)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SecretRef;
    use crate::secrets::{InMemorySecretStore, SecretStoreError};
    use async_trait::async_trait;
    use proptest::prelude::*;

    const NS: &str = "cert-manager";

    fn tpp_spec(ca_bundle: &[u8]) -> IssuerSpec {
        IssuerSpec {
            zone: "devops\\kubernetes".to_string(),
            verbose: true,
            tpp: Some(TppConfig {
                url: "https://tpp.example.com/vedsdk".to_string(),
                credentials_ref: SecretRef::new("tpp-creds"),
                ca_bundle: ca_bundle.to_vec(),
            }),
            cloud: None,
        }
    }

    fn cloud_spec(secret_ref: SecretRef) -> IssuerSpec {
        IssuerSpec {
            zone: "Default".to_string(),
            verbose: false,
            tpp: None,
            cloud: Some(CloudConfig {
                url: "https://api.venafi.cloud/v1".to_string(),
                api_key_secret_ref: secret_ref,
            }),
        }
    }

    fn tpp_store() -> InMemorySecretStore {
        InMemorySecretStore::new()
            .with_secret(NS, "tpp-creds", [("username", "alice"), ("password", "s3cr3t")])
    }

    #[derive(Debug)]
    struct UnavailableStore;

    #[async_trait]
    impl SecretStore for UnavailableStore {
        async fn get(&self, _namespace: &str, _name: &str) -> std::result::Result<SecretData, SecretStoreError> {
            Err(SecretStoreError::backend("connection refused"))
        }
    }

    #[tokio::test]
    async fn test_resolve_tpp_credentials() {
        let store = tpp_store();
        let config = ConfigResolver::default().resolve(NS, &tpp_spec(b""), &store).await.unwrap();

        assert_eq!(config.connector_type, ConnectorType::Tpp);
        assert_eq!(config.base_url, "https://tpp.example.com/vedsdk");
        assert_eq!(config.zone, "devops\\kubernetes");
        assert!(config.verbose);
        assert_eq!(config.trust_bundle, "");
        assert_eq!(
            config.credentials,
            Credentials::UserPassword { user: "alice".to_string(), password: SecretString::new("s3cr3t") }
        );
    }

    #[tokio::test]
    async fn test_resolve_tpp_ca_bundle_becomes_trust_bundle() {
        let store = tpp_store();
        let config = ConfigResolver::default()
            .resolve(NS, &tpp_spec(b"-----BEGIN CERT...-----"), &store)
            .await
            .unwrap();
        assert_eq!(config.trust_bundle, "-----BEGIN CERT...-----");
    }

    #[tokio::test]
    async fn test_resolve_cloud_default_key() {
        let store = InMemorySecretStore::new().with_secret(NS, "cloud-key", [("api-key", "XYZ123")]);
        let config = ConfigResolver::default()
            .resolve(NS, &cloud_spec(SecretRef::new("cloud-key")), &store)
            .await
            .unwrap();

        assert_eq!(config.connector_type, ConnectorType::Cloud);
        assert_eq!(config.base_url, "https://api.venafi.cloud/v1");
        assert_eq!(config.trust_bundle, "");
        assert_eq!(config.credentials, Credentials::ApiKey { value: SecretString::new("XYZ123") });
    }

    #[tokio::test]
    async fn test_resolve_cloud_key_override() {
        let store = InMemorySecretStore::new()
            .with_secret(NS, "cloud-key", [("token", "ABC789"), ("api-key", "unused")]);
        let config = ConfigResolver::default()
            .resolve(NS, &cloud_spec(SecretRef::with_key("cloud-key", "token")), &store)
            .await
            .unwrap();

        assert_eq!(config.credentials, Credentials::ApiKey { value: SecretString::new("ABC789") });
    }

    #[tokio::test]
    async fn test_resolve_missing_secret() {
        let store = InMemorySecretStore::new().with_secret("other-namespace", "tpp-creds", [("username", "alice")]);
        let err = ConfigResolver::default().resolve(NS, &tpp_spec(b""), &store).await.unwrap_err();

        match err {
            IssuerError::SecretLookup { backend, source } => {
                assert_eq!(backend, ConnectorType::Tpp);
                assert!(source.is_not_found());
            }
            other => panic!("expected SecretLookup, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_resolve_backend_failure_is_secret_lookup() {
        let err = ConfigResolver::default()
            .resolve(NS, &cloud_spec(SecretRef::new("cloud-key")), &UnavailableStore)
            .await
            .unwrap_err();

        assert!(matches!(err, IssuerError::SecretLookup { backend: ConnectorType::Cloud, .. }));
        assert!(err.to_string().contains("connection refused"));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_resolve_neither_variant_skips_lookup() {
        let store = tpp_store();
        let spec = IssuerSpec { zone: "z".to_string(), ..Default::default() };
        let err = ConfigResolver::default().resolve(NS, &spec, &store).await.unwrap_err();

        assert!(matches!(err, IssuerError::Configuration { .. }));
        assert!(err.to_string().contains("neither Cloud nor TPP configuration found"));
        assert_eq!(store.lookups(), 0);
    }

    #[tokio::test]
    async fn test_resolve_both_variants_is_configuration_error() {
        let store = tpp_store();
        let mut spec = tpp_spec(b"");
        spec.cloud = Some(CloudConfig::default());

        let err = ConfigResolver::default().resolve(NS, &spec, &store).await.unwrap_err();
        assert!(matches!(err, IssuerError::Configuration { .. }));
        assert_eq!(store.lookups(), 0);
    }

    #[tokio::test]
    async fn test_missing_keys_default_to_empty() {
        let store = InMemorySecretStore::new()
            .with_secret(NS, "tpp-creds", [("username", "alice")])
            .with_secret(NS, "cloud-key", [("something-else", "v")]);

        let tpp = ConfigResolver::default().resolve(NS, &tpp_spec(b""), &store).await.unwrap();
        assert_eq!(
            tpp.credentials,
            Credentials::UserPassword { user: "alice".to_string(), password: SecretString::default() }
        );

        let cloud = ConfigResolver::default()
            .resolve(NS, &cloud_spec(SecretRef::new("cloud-key")), &store)
            .await
            .unwrap();
        assert_eq!(cloud.credentials, Credentials::ApiKey { value: SecretString::default() });
    }

    #[tokio::test]
    async fn test_missing_keys_rejected_under_strict_policy() {
        let store = InMemorySecretStore::new()
            .with_secret(NS, "tpp-creds", [("username", "alice"), ("password", "")]);
        let resolver = ConfigResolver::new(MissingKeyPolicy::Reject);

        let err = resolver.resolve(NS, &tpp_spec(b""), &store).await.unwrap_err();
        match err {
            IssuerError::MissingCredential { namespace, secret, key } => {
                assert_eq!(namespace, NS);
                assert_eq!(secret, "tpp-creds");
                assert_eq!(key, "password");
            }
            other => panic!("expected MissingCredential, got {other:?}"),
        }

        let store = tpp_store();
        assert!(resolver.resolve(NS, &tpp_spec(b""), &store).await.is_ok());
    }

    proptest! {
        #[test]
        fn prop_no_backend_is_always_configuration_error(zone in ".*", verbose in any::<bool>()) {
            let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let store = tpp_store();
            let spec = IssuerSpec { zone, verbose, tpp: None, cloud: None };

            let result = rt.block_on(ConfigResolver::default().resolve(NS, &spec, &store));
            prop_assert!(matches!(result, Err(IssuerError::Configuration { .. })), "expected Configuration error, got {:?}", result);
        }

        #[test]
        fn prop_resolve_is_idempotent(
            user in "[a-z]{1,12}",
            password in "[ -~]{0,24}",
            zone in "[A-Za-z0-9\\\\]{0,16}",
            use_tpp in any::<bool>(),
        ) {
            let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let store = InMemorySecretStore::new()
                .with_secret(NS, "tpp-creds", [("username", user.clone()), ("password", password.clone())])
                .with_secret(NS, "cloud-key", [("api-key", password)]);
            let mut spec = if use_tpp { tpp_spec(b"") } else { cloud_spec(SecretRef::new("cloud-key")) };
            spec.zone = zone;

            let resolver = ConfigResolver::default();
            let first = rt.block_on(resolver.resolve(NS, &spec, &store)).unwrap();
            let second = rt.block_on(resolver.resolve(NS, &spec, &store)).unwrap();
            prop_assert_eq!(first, second);
        }
    }
}
