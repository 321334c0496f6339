//! # Telemetry Initialization
//!
//! One-call tracing setup for binaries and integration tests.

use tracing_subscriber::EnvFilter;

/// Initializes the global tracing subscriber.
///
/// Honors `RUST_LOG` when set; otherwise defaults to info-level output with
/// debug detail for the workspace crates and quiet sqlx. Safe to call more
/// than once (later calls are no-ops), so tests can call it freely.
pub fn init_telemetry() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("info,bazaar_engine=debug,bazaar_db=debug,sqlx=warn")
    });

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
