//! Issuer registry
//!
//! Maps issuer types to the factories that build them. The registry is
//! assembled once during startup and then shared read-only (usually behind an
//! `Arc`); lookups never mutate it.

use super::factory::{IssuerDeps, VenafiIssuerFactory};
use super::resolver::ConfigResolver;
use crate::connector::Connector;
use crate::domain::{GenericIssuer, IssuerKind, IssuerType, ObjectRef};
use crate::errors::{IssuerError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Namespace ClusterIssuer secrets are read from unless configured otherwise
pub const DEFAULT_CLUSTER_RESOURCE_NAMESPACE: &str = "kube-system";

/// An initialised issuer of any type.
pub trait Issuer: Send + Sync + std::fmt::Debug {
    fn issuer_type(&self) -> IssuerType;

    fn object_ref(&self) -> ObjectRef;

    /// Namespace this issuer reads its secrets from
    fn resource_namespace(&self) -> &str;

    /// Backend connector, for issuer types that hold one
    fn connector(&self) -> Option<Arc<dyn Connector>> {
        None
    }
}

/// Builds issuers of one type.
#[async_trait]
pub trait IssuerFactory: Send + Sync + std::fmt::Debug {
    /// The issuer type this factory is registered under
    fn issuer_type(&self) -> IssuerType;

    /// Build an issuer whose secrets live in `namespace`
    async fn create(
        &self,
        namespace: &str,
        issuer: &GenericIssuer,
        deps: &IssuerDeps,
    ) -> Result<Box<dyn Issuer>>;
}

/// Options shared by every issuer the registry builds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuerOptions {
    /// Where ClusterIssuers read their secrets from
    pub cluster_resource_namespace: String,
}

impl Default for IssuerOptions {
    fn default() -> Self {
        Self { cluster_resource_namespace: DEFAULT_CLUSTER_RESOURCE_NAMESPACE.to_string() }
    }
}

impl IssuerOptions {
    /// Namespace an issuer's secrets are read from.
    ///
    /// Issuers use their own namespace (`default` when the manifest omits
    /// it); ClusterIssuers use the cluster resource namespace.
    pub fn resource_namespace(&self, issuer: &GenericIssuer) -> String {
        match issuer.kind {
            IssuerKind::Issuer => {
                issuer.metadata.namespace.clone().unwrap_or_else(|| "default".to_string())
            }
            IssuerKind::ClusterIssuer => self.cluster_resource_namespace.clone(),
        }
    }
}

/// Registry of issuer factories keyed by issuer type.
#[derive(Clone, Default)]
pub struct IssuerRegistry {
    factories: HashMap<IssuerType, Arc<dyn IssuerFactory>>,
    options: IssuerOptions,
}

impl std::fmt::Debug for IssuerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssuerRegistry")
            .field("factories", &self.registered_types())
            .field("options", &self.options)
            .finish()
    }
}

impl IssuerRegistry {
    /// Create a registry with no factories
    pub fn new(options: IssuerOptions) -> Self {
        Self { factories: HashMap::new(), options }
    }

    /// Create a registry with every built-in issuer registered
    pub fn with_default_issuers(options: IssuerOptions, resolver: ConfigResolver) -> Result<Self> {
        let mut registry = Self::new(options);
        registry.register(Arc::new(VenafiIssuerFactory::new(resolver)))?;
        Ok(registry)
    }

    /// Register a factory under its issuer type.
    ///
    /// Each type may be registered once; a second registration is a
    /// configuration error.
    pub fn register(&mut self, factory: Arc<dyn IssuerFactory>) -> Result<()> {
        let issuer_type = factory.issuer_type();
        if self.factories.contains_key(&issuer_type) {
            return Err(IssuerError::configuration(format!(
                "issuer type '{}' is already registered",
                issuer_type
            )));
        }

        info!(issuer_type = %issuer_type, "Registering issuer factory");
        self.factories.insert(issuer_type, factory);
        Ok(())
    }

    /// Check if a factory is registered for `issuer_type`
    pub fn is_registered(&self, issuer_type: IssuerType) -> bool {
        self.factories.contains_key(&issuer_type)
    }

    /// Registered issuer types in name order
    pub fn registered_types(&self) -> Vec<IssuerType> {
        let mut types: Vec<IssuerType> = self.factories.keys().copied().collect();
        types.sort_by_key(|t| t.as_str());
        types
    }

    /// Look up the factory for `issuer_type`
    pub fn lookup(&self, issuer_type: IssuerType) -> Result<Arc<dyn IssuerFactory>> {
        self.factories
            .get(&issuer_type)
            .cloned()
            .ok_or(IssuerError::UnregisteredIssuerType(issuer_type))
    }

    pub fn options(&self) -> &IssuerOptions {
        &self.options
    }

    /// Build the issuer described by `issuer`.
    ///
    /// Detects the issuer type, picks the registered factory and derives the
    /// resource namespace from the registry options.
    pub async fn build(&self, issuer: &GenericIssuer, deps: &IssuerDeps) -> Result<Box<dyn Issuer>> {
        let issuer_type = issuer.spec.issuer_type()?;
        let factory = self.lookup(issuer_type)?;
        let namespace = self.options.resource_namespace(issuer);

        debug!(
            issuer = %issuer.object_ref(),
            issuer_type = %issuer_type,
            namespace = %namespace,
            "Building issuer"
        );
        factory.create(&namespace, issuer, deps).await
    }
}
