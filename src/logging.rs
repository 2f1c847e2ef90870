//! Logging configuration for sqlgate.
//!
//! Logs go to stderr so the result envelope printed on stdout stays
//! machine-readable. Verbosity is controlled through `RUST_LOG`.

use tracing_subscriber::EnvFilter;

/// Initializes the global tracing subscriber.
///
/// Defaults to `info` when `RUST_LOG` is unset.
pub fn init() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}
