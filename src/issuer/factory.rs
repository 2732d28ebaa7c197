//! Venafi issuer construction
//!
//! Resolves the client configuration, asks the connector factory for a live
//! connector and binds both into a [`VenafiIssuer`]. Each failure is recorded
//! as a `FailedInit` warning event against the issuer before it is returned.

use super::events::{EventSink, EventType, REASON_FAILED_INIT};
use super::registry::{Issuer, IssuerFactory};
use super::resolver::ConfigResolver;
use crate::connector::{Connector, ConnectorFactory};
use crate::domain::{ClientConfig, GenericIssuer, IssuerSpec, IssuerType, ObjectRef};
use crate::errors::{IssuerError, Result};
use crate::issuer_span;
use crate::secrets::SecretStore;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, Instrument};

/// Capabilities an issuer needs to initialise.
#[derive(Debug, Clone)]
pub struct IssuerDeps {
    pub secrets: Arc<dyn SecretStore>,
    pub connectors: Arc<dyn ConnectorFactory>,
    pub events: Arc<dyn EventSink>,
}

impl IssuerDeps {
    pub fn new(
        secrets: Arc<dyn SecretStore>,
        connectors: Arc<dyn ConnectorFactory>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self { secrets, connectors, events }
    }
}

/// Builds [`VenafiIssuer`]s. Holds no per-call state.
#[derive(Debug, Clone, Copy, Default)]
pub struct VenafiIssuerFactory {
    resolver: ConfigResolver,
}

impl VenafiIssuerFactory {
    pub fn new(resolver: ConfigResolver) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &ConfigResolver {
        &self.resolver
    }

    /// Initialise a Venafi issuer reading its secrets from `namespace`.
    ///
    /// Emits exactly one `FailedInit` warning on failure and none on success.
    pub async fn build(
        &self,
        namespace: &str,
        issuer: &GenericIssuer,
        deps: &IssuerDeps,
    ) -> Result<VenafiIssuer> {
        let object = issuer.object_ref();
        let span = issuer_span!("init_venafi_issuer", object, namespace = %namespace);

        async {
            let config = match self.resolve(namespace, issuer, deps.secrets.as_ref()).await {
                Ok(config) => config,
                Err(err) => {
                    record_failure(deps, &object, &format!("Failed to initialise issuer: {err}"));
                    return Err(err);
                }
            };
            let connector_type = config.connector_type;

            let client = match deps.connectors.create(config).await {
                Ok(client) => client,
                Err(err) => {
                    record_failure(deps, &object, &format!("Failed to create Venafi client: {err}"));
                    return Err(IssuerError::connector_creation(err));
                }
            };

            info!(connector_type = %connector_type, "Initialised Venafi issuer");

            Ok(VenafiIssuer {
                issuer: issuer.clone(),
                resource_namespace: namespace.to_string(),
                resolver: self.resolver,
                secrets: Arc::clone(&deps.secrets),
                client,
            })
        }
        .instrument(span)
        .await
    }

    async fn resolve(
        &self,
        namespace: &str,
        issuer: &GenericIssuer,
        secrets: &dyn SecretStore,
    ) -> Result<ClientConfig> {
        let spec = venafi_spec(issuer)?;
        self.resolver.resolve(namespace, spec, secrets).await
    }
}

#[async_trait]
impl IssuerFactory for VenafiIssuerFactory {
    fn issuer_type(&self) -> IssuerType {
        IssuerType::Venafi
    }

    async fn create(
        &self,
        namespace: &str,
        issuer: &GenericIssuer,
        deps: &IssuerDeps,
    ) -> Result<Box<dyn Issuer>> {
        Ok(Box::new(self.build(namespace, issuer, deps).await?))
    }
}

fn venafi_spec(issuer: &GenericIssuer) -> Result<&IssuerSpec> {
    issuer
        .spec
        .venafi
        .as_ref()
        .ok_or_else(|| IssuerError::configuration("issuer has no venafi configuration"))
}

fn record_failure(deps: &IssuerDeps, object: &ObjectRef, message: &str) {
    deps.events.record(object, EventType::Warning, REASON_FAILED_INIT, message);
}

/// An initialised Venafi issuer.
#[derive(Debug, Clone)]
pub struct VenafiIssuer {
    issuer: GenericIssuer,
    resource_namespace: String,
    resolver: ConfigResolver,
    secrets: Arc<dyn SecretStore>,
    client: Arc<dyn Connector>,
}

impl VenafiIssuer {
    /// The issuer resource this handle was built from
    pub fn issuer(&self) -> &GenericIssuer {
        &self.issuer
    }

    /// The `venafi` block of the issuer
    pub fn spec(&self) -> Result<&IssuerSpec> {
        venafi_spec(&self.issuer)
    }

    /// Live connector for the selected backend
    pub fn client(&self) -> Arc<dyn Connector> {
        Arc::clone(&self.client)
    }

    /// Resolve the client configuration again from current secret content.
    ///
    /// Does not touch the existing connector.
    pub async fn refresh_config(&self) -> Result<ClientConfig> {
        self.resolver
            .resolve(&self.resource_namespace, self.spec()?, self.secrets.as_ref())
            .await
    }
}

impl Issuer for VenafiIssuer {
    fn issuer_type(&self) -> IssuerType {
        IssuerType::Venafi
    }

    fn object_ref(&self) -> ObjectRef {
        self.issuer.object_ref()
    }

    fn resource_namespace(&self) -> &str {
        &self.resource_namespace
    }

    fn connector(&self) -> Option<Arc<dyn Connector>> {
        Some(self.client())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::ConnectorError;
    use crate::domain::{
        ConnectorType, Credentials, GenericIssuerSpec, IssuerKind, IssuerMeta, SecretRef, TppConfig,
    };
    use crate::issuer::events::RecordingEventSink;
    use crate::secrets::{InMemorySecretStore, SecretString};
    use std::sync::Mutex;
    use tracing_test::traced_test;

    #[derive(Debug)]
    struct StubConnector {
        config: ClientConfig,
    }

    impl Connector for StubConnector {
        fn connector_type(&self) -> ConnectorType {
            self.config.connector_type
        }

        fn base_url(&self) -> &str {
            &self.config.base_url
        }

        fn zone(&self) -> &str {
            &self.config.zone
        }
    }

    #[derive(Debug, Default)]
    struct StubConnectorFactory {
        fail_with: Option<String>,
        received: Mutex<Vec<ClientConfig>>,
    }

    #[async_trait]
    impl ConnectorFactory for StubConnectorFactory {
        async fn create(&self, config: ClientConfig) -> std::result::Result<Arc<dyn Connector>, ConnectorError> {
            self.received.lock().unwrap().push(config.clone());
            match &self.fail_with {
                Some(message) => Err(ConnectorError::backend(message.clone())),
                None => Ok(Arc::new(StubConnector { config })),
            }
        }
    }

    fn tpp_issuer() -> GenericIssuer {
        GenericIssuer {
            api_version: None,
            kind: IssuerKind::Issuer,
            metadata: IssuerMeta { name: "venafi-tpp".to_string(), namespace: Some("team-a".to_string()) },
            spec: GenericIssuerSpec {
                venafi: Some(IssuerSpec {
                    zone: "devops".to_string(),
                    verbose: false,
                    tpp: Some(TppConfig {
                        url: "https://tpp.example.com/vedsdk".to_string(),
                        credentials_ref: SecretRef::new("tpp-creds"),
                        ca_bundle: Vec::new(),
                    }),
                    cloud: None,
                }),
                ..Default::default()
            },
        }
    }

    fn deps(
        store: Arc<InMemorySecretStore>,
        connectors: Arc<StubConnectorFactory>,
        events: Arc<RecordingEventSink>,
    ) -> IssuerDeps {
        IssuerDeps::new(store, connectors, events)
    }

    fn creds_store() -> Arc<InMemorySecretStore> {
        Arc::new(
            InMemorySecretStore::new()
                .with_secret("team-a", "tpp-creds", [("username", "alice"), ("password", "s3cr3t")]),
        )
    }

    #[tokio::test]
    async fn test_build_success_records_no_events() {
        let connectors = Arc::new(StubConnectorFactory::default());
        let events = Arc::new(RecordingEventSink::new());
        let deps = deps(creds_store(), connectors.clone(), events.clone());

        let issuer = VenafiIssuerFactory::default().build("team-a", &tpp_issuer(), &deps).await.unwrap();

        assert!(events.is_empty());
        assert_eq!(issuer.resource_namespace(), "team-a");
        assert_eq!(issuer.client().connector_type(), ConnectorType::Tpp);
        assert_eq!(issuer.client().base_url(), "https://tpp.example.com/vedsdk");

        let received = connectors.received.lock().unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(
            received[0].credentials,
            Credentials::UserPassword { user: "alice".to_string(), password: SecretString::new("s3cr3t") }
        );
    }

    #[tokio::test]
    async fn test_build_resolver_failure_records_one_event() {
        let connectors = Arc::new(StubConnectorFactory::default());
        let events = Arc::new(RecordingEventSink::new());
        let empty_store = Arc::new(InMemorySecretStore::new());
        let deps = deps(empty_store, connectors.clone(), events.clone());

        let err = VenafiIssuerFactory::default().build("team-a", &tpp_issuer(), &deps).await.unwrap_err();

        assert!(matches!(err, IssuerError::SecretLookup { .. }));
        assert!(connectors.received.lock().unwrap().is_empty());

        let recorded = events.events();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].event_type, EventType::Warning);
        assert_eq!(recorded[0].reason, "FailedInit");
        assert_eq!(recorded[0].message, format!("Failed to initialise issuer: {err}"));
        assert_eq!(recorded[0].object.name, "venafi-tpp");
    }

    #[tokio::test]
    async fn test_build_connector_failure_records_one_event() {
        let connectors = Arc::new(StubConnectorFactory {
            fail_with: Some("x509: certificate signed by unknown authority".to_string()),
            ..Default::default()
        });
        let events = Arc::new(RecordingEventSink::new());
        let deps = deps(creds_store(), connectors, events.clone());

        let err = VenafiIssuerFactory::default().build("team-a", &tpp_issuer(), &deps).await.unwrap_err();

        assert!(matches!(err, IssuerError::ConnectorCreation { .. }));
        assert_eq!(
            err.to_string(),
            "error creating Venafi client: x509: certificate signed by unknown authority"
        );

        let recorded = events.events();
        assert_eq!(recorded.len(), 1);
        assert_eq!(
            recorded[0].message,
            "Failed to create Venafi client: x509: certificate signed by unknown authority"
        );
    }

    #[tokio::test]
    async fn test_build_without_venafi_block() {
        let events = Arc::new(RecordingEventSink::new());
        let deps = deps(creds_store(), Arc::new(StubConnectorFactory::default()), events.clone());
        let mut issuer = tpp_issuer();
        issuer.spec.venafi = None;

        let err = VenafiIssuerFactory::default().build("team-a", &issuer, &deps).await.unwrap_err();
        assert!(matches!(err, IssuerError::Configuration { .. }));
        assert_eq!(events.len(), 1);
    }

    #[tokio::test]
    async fn test_refresh_config_sees_rotated_secret() {
        let store = creds_store();
        let deps = deps(
            store.clone(),
            Arc::new(StubConnectorFactory::default()),
            Arc::new(RecordingEventSink::new()),
        );
        let issuer = VenafiIssuerFactory::default().build("team-a", &tpp_issuer(), &deps).await.unwrap();

        let unchanged = issuer.refresh_config().await.unwrap();
        assert_eq!(unchanged, issuer.refresh_config().await.unwrap());

        let mut rotated = crate::secrets::SecretData::new();
        rotated.insert("username".to_string(), b"alice".to_vec());
        rotated.insert("password".to_string(), b"n3w-pass".to_vec());
        store.insert("team-a", "tpp-creds", rotated).await;

        let refreshed = issuer.refresh_config().await.unwrap();
        assert_ne!(unchanged, refreshed);
        assert_eq!(
            refreshed.credentials,
            Credentials::UserPassword { user: "alice".to_string(), password: SecretString::new("n3w-pass") }
        );
    }

    #[traced_test]
    #[tokio::test]
    async fn test_build_logs_within_issuer_span() {
        let deps = deps(
            creds_store(),
            Arc::new(StubConnectorFactory::default()),
            Arc::new(RecordingEventSink::new()),
        );
        VenafiIssuerFactory::default().build("team-a", &tpp_issuer(), &deps).await.unwrap();

        assert!(logs_contain("Initialised Venafi issuer"));
        assert!(logs_contain("init_venafi_issuer"));
        assert!(!logs_contain("s3cr3t"));
    }
}
