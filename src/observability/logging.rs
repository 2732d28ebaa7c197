//! # Structured Logging
//!
//! Subscriber setup and span helpers built on the tracing ecosystem.

use crate::config::ObservabilityConfig;
use crate::errors::{IssuerError, Result};
use tracing_subscriber::{fmt, EnvFilter};

/// Create a tracing span for an issuer operation.
///
/// ```rust,ignore
/// let span = issuer_span!("init_venafi_issuer", issuer.object_ref(), namespace = %ns);
/// ```
#[macro_export]
macro_rules! issuer_span {
    ($operation:expr, $issuer:expr) => {
        tracing::info_span!(
            "issuer_operation",
            operation = %$operation,
            issuer = %$issuer,
            operation_id = %uuid::Uuid::new_v4()
        )
    };
    ($operation:expr, $issuer:expr, $($field:tt)*) => {
        tracing::info_span!(
            "issuer_operation",
            operation = %$operation,
            issuer = %$issuer,
            operation_id = %uuid::Uuid::new_v4(),
            $($field)*
        )
    };
}

/// Install the global subscriber.
///
/// `RUST_LOG` wins over the configured level. Returns `Ok(false)` when a
/// subscriber was already installed (tests, embedding applications).
pub fn init_logging(config: &ObservabilityConfig) -> Result<bool> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| {
            IssuerError::configuration_with_source(
                format!("invalid log level '{}'", config.log_level),
                Box::new(e),
            )
        })?;

    let installed = if config.json_logging {
        fmt().json().with_env_filter(filter).with_current_span(true).try_init().is_ok()
    } else {
        fmt().with_env_filter(filter).with_target(true).try_init().is_ok()
    };

    if installed {
        tracing::debug!(
            service_name = %config.service_name,
            log_level = %config.log_level,
            json = config.json_logging,
            "Logging initialised"
        );
    }
    Ok(installed)
}
