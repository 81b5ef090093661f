//! Log sink setup
//!
//! Every classification, debounce decision, diff and notification outcome is
//! logged through `tracing`. Output goes to stderr and, append-mode, to a
//! log file inside the watched directory; that file is recognized by name
//! and excluded from watching so the process never notifies about its own
//! output.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Arc;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::WatchpostResult;

/// Default log artifact name inside the watched directory
pub const DEFAULT_LOG_FILE: &str = "file_monitor.log";

/// Initialize the process-wide subscriber: stderr plus an append-mode file.
///
/// Verbosity comes from the `-v` count unless `RUST_LOG` overrides it.
/// Calling this more than once is a no-op (the first subscriber wins), which
/// keeps it safe under the test harness.
pub fn init(log_path: &Path, verbose: u8) -> WatchpostResult<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)?;

    let fallback = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let file_layer = fmt::layer().with_ansi(false).with_writer(Arc::new(file));
    let stderr_layer = fmt::layer().with_writer(std::io::stderr);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init();

    Ok(())
}
