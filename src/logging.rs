//! Tracing setup shared by the binaries.

use tracing_subscriber::EnvFilter;

/// Install a `fmt` subscriber on stderr.
///
/// `RUST_LOG` wins when set and valid; otherwise `default` (e.g. `"info"`)
/// is used. Calling this twice is harmless.
pub fn init_tracing(default: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let result = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();

    if let Err(err) = result {
        tracing::debug!(error = %err, "tracing already initialized");
    }
}
