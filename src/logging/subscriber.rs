//! Diagnostics for the engine itself
//!
//! The engine reports skipped files, failed deletions and similar through
//! `tracing`. Hosts that have no subscriber of their own can install this one.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Install a stderr fmt subscriber filtered by `RUST_LOG`, or `default_filter`
///
/// Returns false when a global subscriber was already set.
pub fn init_diagnostics(default_filter: &str) -> bool {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .try_init()
        .is_ok()
}
