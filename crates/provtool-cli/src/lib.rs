//! Shared plumbing for the six command-line surfaces (§6.3): each binary
//! is a thin shell that parses arguments, installs logging, and calls into
//! the library crate that owns the actual behavior.

use std::sync::Mutex;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Install a `tracing` subscriber writing to stderr, plus an append-mode log
/// file named after the tool (matching the reference tool's one-file-per-
/// component convention, e.g. `DirectoryWrapper.log`, `Validator.log`). Both
/// sinks share one env-filter, so `RUST_LOG` controls them together.
pub fn init_logging(log_file_name: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stderr_layer = fmt::layer().with_writer(std::io::stderr);

    match std::fs::OpenOptions::new().create(true).append(true).open(log_file_name) {
        Ok(file) => {
            let file_layer = fmt::layer().with_writer(Mutex::new(file)).with_ansi(false);
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .with(file_layer)
                .init();
        }
        Err(_) => {
            tracing_subscriber::registry().with(filter).with(stderr_layer).init();
        }
    }
}
