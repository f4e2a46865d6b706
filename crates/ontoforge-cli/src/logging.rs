//! Tracing setup for the binary.
//!
//! Two sinks:
//! - stderr: `warn` by default, `RUST_LOG` (or `info`) with `--verbose`, off with `--quiet`;
//! - an append-only plain-text file (`app.log` by default) at `info`.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

pub const DEFAULT_LOG_FILE: &str = "app.log";

pub fn init_tracing(verbose: bool, quiet: bool, log_file: Option<&Path>) {
    let stderr_filter = if quiet {
        EnvFilter::new("off")
    } else if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())
    } else {
        EnvFilter::new("warn")
    };
    let stderr_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(stderr_filter);

    let file_layer = log_file.and_then(|path| {
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(true)
                    .with_writer(Mutex::new(file))
                    .with_filter(EnvFilter::new("info")),
            ),
            Err(e) => {
                eprintln!("warning: cannot open log file `{}`: {e}", path.display());
                None
            }
        }
    });

    let _ = tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .try_init();
}
