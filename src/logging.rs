//! Logging configuration using the tracing ecosystem.
//!
//! The library itself only emits `tracing` events and spans. Applications
//! that do not install their own subscriber can call [`init`] to get:
//! - File-based output with daily rotation
//! - Log level configuration via `RUST_LOG`
//! - File/line and thread ids on every record
//!
//! Credentials and the `Authorization` header are never logged.

use std::path::{Path, PathBuf};

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

/// Default log level if RUST_LOG is not set.
const DEFAULT_LOG_FILTER: &str = "jira_rest=info,warn";

/// File name prefix of the rotated log files.
const LOG_FILE_PREFIX: &str = "jira-rest.log";

/// Initialize the logging system, writing to `log_dir`.
///
/// Pass [`log_directory()`] for the platform default.
///
/// # Errors
///
/// Returns an error if:
/// - The log directory cannot be created
/// - A global tracing subscriber is already set
///
/// # Example
///
/// ```no_run
/// use jira_rest::logging;
///
/// let dir = logging::log_directory().expect("no data directory");
/// logging::init(&dir).expect("Failed to initialize logging");
/// ```
pub fn init(log_dir: &Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(log_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, LOG_FILE_PREFIX);

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let subscriber = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .with(filter);

    tracing::subscriber::set_global_default(subscriber)?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "jira-rest logging started");
    tracing::debug!(log_dir = %log_dir.display(), "Log directory");

    Ok(())
}

/// Get the log directory path.
fn get_log_directory() -> anyhow::Result<PathBuf> {
    let base_dir = dirs::data_local_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine local data directory"))?;

    Ok(base_dir.join("jira-rest").join("logs"))
}

/// The platform default log directory, `<local data dir>/jira-rest/logs`.
pub fn log_directory() -> Option<PathBuf> {
    get_log_directory().ok()
}
