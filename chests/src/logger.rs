//! Log output for the chests binary.
//!
//! The library crates log through `log`; records are bridged into `tracing`
//! and printed by a `tracing-subscriber` formatter filtered by `RUST_LOG`.

use tracing::subscriber;
use tracing_log::LogTracer;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Installs the global logger. Safe to call more than once; later calls are no-ops.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();

    if subscriber::set_global_default(subscriber).is_err() {
        return;
    }
    if let Err(err) = LogTracer::init() {
        tracing::warn!("Could not forward log records: {err}");
    }
}
