use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Logs to stderr so stdout stays free for records and JSON output.
/// `RUST_LOG` overrides the default `info` filter.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .try_init();
}
