//! Telemetry helpers for the webhook relay.
//! Installs the tracing subscriber and wraps the metric names the relay emits.

use anyhow::Result;

mod config;
mod metrics;
mod tracing_init;

pub use config::TelemetryConfig;
pub use self::metrics::{RequestOutcome, finish_span, record_forward_duration, record_outcome};
pub use tracing_init::init_telemetry;

/// Installs the shared subscriber, configured from `RUST_LOG` and `LOG_FORMAT`.
pub fn install(service_name: &str) -> Result<()> {
    init_telemetry(TelemetryConfig::from_env(
        service_name,
        env!("CARGO_PKG_VERSION"),
    ))
}
