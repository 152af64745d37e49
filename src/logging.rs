//! Tracing setup.
//!
//! Events go to stdout through a compact formatter and are mirrored, without ANSI colors, to
//! [`Config::log_file`]. The file is opened in append mode behind a non-blocking writer; if it
//! cannot be opened the service keeps running with stdout only.
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::OnceLock;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::Config;

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Install the global subscriber and record the loaded configuration.
///
/// `RUST_LOG` controls filtering and defaults to `info`.
pub fn init_tracing(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout_layer = fmt::layer().with_target(false).compact();

    let file_layer = match open_log_file(&config.log_file) {
        Ok(file) => {
            let (writer, guard) = tracing_appender::non_blocking(file);
            let _ = LOG_GUARD.set(guard);
            Some(
                fmt::layer()
                    .with_writer(writer)
                    .with_target(true)
                    .with_ansi(false)
                    .compact(),
            )
        }
        Err(err) => {
            eprintln!(
                "Failed to open log file {}: {err}",
                config.log_file.display()
            );
            None
        }
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    log_loaded_config(config);
}

fn log_loaded_config(config: &Config) {
    tracing::debug!(
        backend = ?config.storage_backend,
        database = ?config.mongo_database,
        collection = %config.student_collection,
        server_port = config.server_port,
        log_file = %config.log_file.display(),
        "Loaded configuration"
    );
}

/// Creates missing parent directories.
fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}
