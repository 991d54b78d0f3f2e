// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Structured logging setup. A global `tracing_subscriber::fmt` subscriber
//! writes through `tracing_appender::non_blocking` to the log file named on
//! the command line.

use std::fs::OpenOptions;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;

use crate::cli::LogLevel;
use crate::error::DaemonError;

/// Install the global subscriber. The returned guard must be held for the
/// lifetime of the process — dropping it flushes and stops the background
/// writer thread.
pub fn init(log_file: &Path, level: LogLevel) -> Result<WorkerGuard, DaemonError> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .map_err(|e| DaemonError::LogFile(log_file.to_path_buf(), e))?;

    let (writer, guard) = tracing_appender::non_blocking(file);

    let subscriber = tracing_subscriber::fmt()
        .with_writer(writer)
        .with_ansi(false)
        .with_max_level(level.filter())
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| DaemonError::Logging(e.to_string()))?;

    Ok(guard)
}
