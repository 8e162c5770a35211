//! Structured logging with `tracing`.
//!
//! Library code only emits events; binaries call [`init_subscriber`] once.
//! Tests use [`test_utils::capture_logs`] to assert on what was logged.

pub mod test_utils;

pub use test_utils::{CapturedEvent, CapturedLogs, capture_logs};

/// Initialize the global tracing subscriber writing to stderr.
///
/// `RUST_LOG` wins over `level` when set. Subsequent calls are no-ops.
pub fn init_subscriber(level: &str) {
    init_with_format(level, false);
}

/// Like [`init_subscriber`] but emits one JSON object per line.
pub fn init_json_subscriber(level: &str) {
    init_with_format(level, true);
}

fn init_with_format(level: &str, json: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    // try_init fails if a global subscriber is already set
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.compact().try_init()
    };
}
