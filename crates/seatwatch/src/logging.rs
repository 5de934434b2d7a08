//! Tracing setup: timestamped lines to stdout and to an append-only log file.

use crate::types::{MonitorError, MonitorResult};
use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Local wall-clock timestamps, second precision.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalTime;

impl FormatTime for LocalTime {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"))
    }
}

/// Open (creating parents as needed) the log file for appending.
pub fn open_log_file(path: &Path) -> MonitorResult<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(OpenOptions::new().create(true).append(true).open(path)?)
}

/// Install the global subscriber. `RUST_LOG` overrides `level`.
pub fn init(level: &str, log_file: &Path) -> MonitorResult<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let file = open_log_file(log_file)?;

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_timer(LocalTime)
                .with_target(false)
                .with_writer(std::io::stdout),
        )
        .with(
            fmt::layer()
                .with_timer(LocalTime)
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .try_init()
        .map_err(|e| MonitorError::Config(format!("logging already initialized: {e}")))
}
