//! # Error Handling
//!
//! Error types for issuer resolution and initialisation.

pub mod types;

pub use types::{IssuerError, Result};
