//! Issuer initialisation.
//!
//! # Architecture
//!
//! ```text
//! IssuerRegistry ─► VenafiIssuerFactory ─► ConfigResolver ─► SecretStore
//!                          │
//!                          └──────────────► ConnectorFactory
//! ```
//!
//! - [`ConfigResolver`] turns the `venafi` block of an issuer into a
//!   [`ClientConfig`](crate::domain::ClientConfig), reading credentials from
//!   the secret store.
//! - [`VenafiIssuerFactory`] hands the config to the connector factory and
//!   records a `FailedInit` event through the [`EventSink`] when either step
//!   fails.
//! - [`IssuerRegistry`] maps issuer types to factories. It is built during
//!   startup and only read afterwards.
//!
//! Dependencies are passed explicitly through [`IssuerDeps`]; nothing here
//! holds global state.

pub mod events;
pub mod factory;
pub mod registry;
pub mod resolver;

pub use events::{
    EventSink, EventType, RecordedEvent, RecordingEventSink, TracingEventSink, REASON_FAILED_INIT,
};
pub use factory::{IssuerDeps, VenafiIssuer, VenafiIssuerFactory};
pub use registry::{
    Issuer, IssuerFactory, IssuerOptions, IssuerRegistry, DEFAULT_CLUSTER_RESOURCE_NAMESPACE,
};
pub use resolver::{ConfigResolver, MissingKeyPolicy};
