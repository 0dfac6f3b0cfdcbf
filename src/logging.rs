//! Log to stderr and to a dated file under `~/.coordgeom_logs`.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Directory for log files, directly under the home directory.
const LOG_DIR_NAME: &str = ".coordgeom_logs";

/// `~/.coordgeom_logs`, if there is a home directory.
pub fn log_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(LOG_DIR_NAME))
}

/// `coordgeom_YYYYMMDD.log`, one file per day.
pub fn log_file_name() -> String {
    format!("coordgeom_{}.log", chrono::Local::now().format("%Y%m%d"))
}

/// Install the global subscriber.
///
/// Stderr shows warnings and errors. The log file, when enabled, records everything the
/// filter lets through; `RUST_LOG` overrides the default `info,coordgeom=debug`. Keep the
/// returned guard alive until exit so buffered lines reach the file.
pub fn init(log_to_file: bool) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,coordgeom=debug"));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .with_filter(LevelFilter::WARN);

    let (file_layer, guard) = match log_to_file.then(open_log_dir).flatten() {
        Some(dir) => {
            let file_appender = tracing_appender::rolling::never(dir, log_file_name());
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_level(true);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(file_layer.map(|layer| layer.with_filter(filter)))
        .with(stderr_layer)
        .init();

    guard
}

/// Create the log directory and mark the start of a session in today's file.
fn open_log_dir() -> Option<PathBuf> {
    let dir = log_dir()?;
    if fs::create_dir_all(&dir).is_err() {
        eprintln!("Failed to create log directory {}", dir.display());
        return None;
    }

    if let Ok(mut file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join(log_file_name()))
    {
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        let _ = writeln!(file, "\n=== Session started at {timestamp} ===\n");
    }
    Some(dir)
}
