//! Logging and tracing setup.
//!
//! Logs go to stderr so stdout stays reserved for operator output and JSON
//! reports. Filtering follows `RUST_LOG`, defaulting to `info`.

use std::sync::Once;

use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize the global tracing subscriber with human-readable output.
///
/// Subsequent calls (including to [`init_tracing_json`]) are ignored.
pub fn init_tracing() {
    INIT.call_once(|| {
        let fmt_layer = fmt::layer().with_writer(std::io::stderr).with_target(true);

        tracing_subscriber::registry().with(env_filter()).with(fmt_layer).init();

        info!("objc-xref tracing initialized");
    });
}

/// Initialize tracing with JSON output for structured logging.
pub fn init_tracing_json() {
    INIT.call_once(|| {
        let fmt_layer = fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_current_span(true);

        tracing_subscriber::registry().with(env_filter()).with(fmt_layer).init();

        info!("objc-xref tracing initialized (JSON mode)");
    });
}
