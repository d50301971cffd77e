//! `tracing` subscriber setup.
//!
//! Filtering follows `RUST_LOG` (default `info`). The TUI owns the terminal,
//! so it logs to a file instead of stderr.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::error::AppError;

/// Log file used while the TUI is running.
pub const TUI_LOG_FILE: &str = "kwdash.log";

const DEFAULT_FILTER: &str = "info";

#[derive(Debug, Clone)]
pub enum LogTarget {
    Stderr,
    File(PathBuf),
}

/// Install the global subscriber. Calling it twice is harmless.
pub fn init(target: LogTarget) -> Result<(), AppError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);

    let installed = match target {
        LogTarget::Stderr => builder.with_writer(std::io::stderr).try_init(),
        LogTarget::File(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .map_err(|e| AppError::new(2, format!("Failed to open log file '{}': {e}", path.display())))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).try_init()
        }
    };

    // Only one global subscriber per process; later calls keep the first one.
    if let Err(e) = installed {
        tracing::debug!(error = %e, "tracing subscriber already installed");
    }

    Ok(())
}
