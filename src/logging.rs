//! Structured logging setup for the helper binaries.
//!
//! The library only emits `tracing` events; binaries call `init` once so the
//! events reach stderr, leaving stdout for machine-readable output.

use crate::runtime;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install a stderr fmt subscriber filtered by `FLATWIRE_LOG` (default `warn`).
///
/// Safe to call more than once; later calls leave the first subscriber in place.
pub fn init() {
    let filter = EnvFilter::try_new(runtime::log_filter_from_env())
        .unwrap_or_else(|_| EnvFilter::new(runtime::DEFAULT_LOG_FILTER));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();
}
