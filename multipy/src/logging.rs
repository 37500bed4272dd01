//! Logging setup for the `multipy` binary.
//!
//! Events go to two places:
//! - `~/.multipy/logs/multipy.log`, truncated at the start of each session
//! - stderr, so step progress printed on stdout stays clean
//!
//! The level defaults to `info` and can be overridden through `RUST_LOG`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Guard that must be kept alive for the duration of logging.
///
/// Dropping this guard will flush and close the log file writer.
pub struct LoggingGuard {
    _file_guard: WorkerGuard,
}

/// Initialize logging.
///
/// Creates `log_dir` if needed and truncates `log_file` inside it. Returns
/// the guard that keeps the file writer alive.
pub fn init_logging(log_dir: &Path, log_file: &str) -> Result<LoggingGuard, io::Error> {
    fs::create_dir_all(log_dir)?;
    truncate_log(&log_dir.join(log_file))?;

    let file_appender = tracing_appender::rolling::never(log_dir, log_file);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false);

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
        .compact();

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer)
        .init();

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

fn truncate_log(path: &Path) -> io::Result<()> {
    fs::write(path, "")
}

/// Default log directory (`~/.multipy/logs`).
pub fn default_log_dir() -> PathBuf {
    crate::config::default_log_dir()
}

/// Default log file name.
pub fn default_log_file() -> &'static str {
    "multipy.log"
}
