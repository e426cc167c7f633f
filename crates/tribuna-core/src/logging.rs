//! Log file initialization.
//!
//! Logs go to `${TRIBUNA_HOME}/logs/tribuna.log`, never to stderr: the TUI
//! owns the terminal. Initialization is best-effort and must not fail the
//! application; an unwritable log directory simply disables logging.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Log file name inside the log directory.
pub const LOG_FILE: &str = "tribuna.log";

/// Environment variable controlling the log filter.
pub const LOG_ENV: &str = "TRIBUNA_LOG";

/// Initializes file logging and returns the writer guard.
///
/// The guard must be held for the lifetime of the process; dropping it
/// flushes and stops the background writer. Returns `None` when the log
/// directory cannot be created or a subscriber is already installed.
pub fn init(log_dir: &Path) -> Option<WorkerGuard> {
    if std::fs::create_dir_all(log_dir).is_err() {
        return None;
    }

    let appender = tracing_appender::rolling::never(log_dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .is_ok();

    installed.then_some(guard)
}
