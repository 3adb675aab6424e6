//! Observability: tracing subscriber setup and client metrics
//!
//! Library code only emits `tracing` events. Binaries (and the demo under
//! `crates/infra/examples`) call [`init_tracing`] once at startup to decide
//! where those events go.

pub mod metrics;

use bookstore_domain::{BookstoreError, LogFormat, LoggingConfig, Result};
use tracing_subscriber::EnvFilter;

pub use metrics::{ClientMetrics, MetricsSnapshot};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `config.level` when set.
///
/// # Errors
/// Returns `BookstoreError::Config` if the filter directive is invalid or a
/// global subscriber is already installed.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| BookstoreError::Config(format!("Invalid log filter: {e}")))?;

    let installed = match config.format {
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).try_init(),
        LogFormat::Json => tracing_subscriber::fmt().json().with_env_filter(filter).try_init(),
    };

    installed.map_err(|e| BookstoreError::Config(format!("Failed to install subscriber: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_install_is_an_error_not_a_panic() {
        let config = LoggingConfig::default();
        let _ = init_tracing(&config);
        let second = init_tracing(&config);
        assert!(matches!(second, Err(BookstoreError::Config(_))));
    }
}
