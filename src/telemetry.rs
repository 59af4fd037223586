use std::{fs, path::PathBuf};

use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::constants::STORAGE;

const LOG_ENV_VAR: &str = "STICKER_YEAR_LOG";

pub enum LogTarget {
    Stderr,
    /// Directory for the log file; used while the terminal is in raw mode.
    File(PathBuf),
}

/// Flushes buffered log lines when dropped.
pub struct TelemetryGuard {
    _guard: Option<WorkerGuard>,
}

pub fn init(verbosity: u8, target: LogTarget) -> TelemetryGuard {
    let filter = EnvFilter::builder()
        .with_default_directive(level_from_verbosity(verbosity).into())
        .with_env_var(LOG_ENV_VAR)
        .from_env_lossy();

    match target {
        LogTarget::Stderr => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .try_init();
            TelemetryGuard { _guard: None }
        }
        LogTarget::File(dir) => {
            if let Err(e) = fs::create_dir_all(&dir) {
                eprintln!("Warning: could not create log directory {}: {e}", dir.display());
                return TelemetryGuard { _guard: None };
            }
            let appender = tracing_appender::rolling::never(&dir, STORAGE.log_file);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(writer)
                .try_init();
            TelemetryGuard {
                _guard: Some(guard),
            }
        }
    }
}

fn level_from_verbosity(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}
