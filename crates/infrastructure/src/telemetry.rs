//! Telemetry initialization
//!
//! Console tracing with an env-filter directive taken from configuration;
//! the `RUST_LOG` environment variable overrides it when set.

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::TelemetryConfig;

/// Initialize the global tracing subscriber.
///
/// Safe to call more than once: subsequent calls are no-ops (relevant for
/// tests, which may race to install a subscriber).
pub fn init_telemetry(config: &TelemetryConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok();

    if installed {
        info!(filter = %config.log_filter, "Telemetry initialized");
    }
}
