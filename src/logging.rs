//! Tracing configuration and log routing.
//!
//! The backend logs to stdout with a compact formatter and, when possible,
//! to a file through a non-blocking writer so the request path never waits
//! on disk. The file target comes from [`Config::log_file`]; there is no
//! environment read here — `main` resolves configuration and hands the
//! path in.
//!
//! [`Config::log_file`]: crate::config::Config::log_file

use std::path::Path;
use std::sync::OnceLock;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Default log location when no explicit path is configured.
const DEFAULT_LOG_DIR: &str = "logs";
const DEFAULT_LOG_FILE: &str = "documind.log";

// Keeps the non-blocking writer flushing for the process lifetime.
static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Install the global tracing subscriber.
///
/// `RUST_LOG` controls filtering (default `info`). When `log_file` is set
/// that exact file is appended to; otherwise logs go to
/// `logs/documind.log`. A file that cannot be opened downgrades to
/// stdout-only logging rather than failing startup.
pub fn init_tracing(log_file: Option<&Path>) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout_layer = fmt::layer().with_target(false).compact();

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer);

    match file_writer(log_file) {
        Some(writer) => {
            let file_layer = fmt::layer()
                .with_writer(writer)
                .with_target(true)
                .with_ansi(false)
                .compact();
            registry.with(file_layer).init();
        }
        None => registry.init(),
    }
}

/// Open the log target and wrap it in a non-blocking writer.
///
/// Returns `None` when the file (or the default `logs/` directory) cannot
/// be created.
fn file_writer(log_file: Option<&Path>) -> Option<NonBlocking> {
    let file = match log_file {
        Some(path) => std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|err| eprintln!("Failed to open log file {}: {err}", path.display()))
            .ok()?,
        None => {
            std::fs::create_dir_all(DEFAULT_LOG_DIR)
                .map_err(|err| eprintln!("Failed to create {DEFAULT_LOG_DIR} directory: {err}"))
                .ok()?;
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(Path::new(DEFAULT_LOG_DIR).join(DEFAULT_LOG_FILE))
                .map_err(|err| eprintln!("Failed to open default log file: {err}"))
                .ok()?
        }
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file);
    let _ = LOG_GUARD.set(guard);
    Some(non_blocking)
}
