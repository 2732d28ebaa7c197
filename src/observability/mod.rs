//! # Observability Infrastructure
//!
//! Structured logging for the issuer tooling. Every component logs through
//! `tracing`; this module only wires up the subscriber and span helpers.

pub mod logging;

pub use logging::init_logging;
