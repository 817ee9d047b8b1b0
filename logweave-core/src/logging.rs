//! Process setup around the sink: the `tracing` subscriber and the log directory.
//!
//! The subscriber's own filter defaults to `trace` so that the sink
//! threshold is the gate that matters. `RUST_LOG` still narrows it.

use std::fs;
use std::path::Path;

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, LoggerConfig};
use crate::error::{IoResultExt, LogResult};

/// Installs the global `tracing` subscriber described by `config`.
///
/// Output goes to stderr. Returns `false` when another subscriber was
/// already installed, in which case that one keeps receiving events.
pub fn init_structured_logging(config: &LoggerConfig) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("trace"));

    match config.format {
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_ansi(config.colorize)
            .with_level(true)
            .with_target(false)
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
            .is_ok(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_ansi(false)
            .with_level(true)
            .with_target(true)
            .with_current_span(true)
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
            .is_ok(),
    }
}

/// Makes sure `dir` exists as a directory. Idempotent.
///
/// Returns `true` when the directory had to be created.
pub fn ensure_log_directory(dir: &Path) -> LogResult<bool> {
    if dir.is_dir() {
        return Ok(false);
    }

    info!(
        directory = %dir.display(),
        "Log directory not found. Attempting to create log directory"
    );
    fs::create_dir_all(dir).with_path(dir)?;
    Ok(true)
}
