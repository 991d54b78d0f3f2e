// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command line surface: `taskmaster <config_file> <log_file> [log_level]`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// A foreground process supervisor.
#[derive(Debug, Parser)]
#[command(name = "taskmaster", version, about = "A foreground process supervisor")]
pub struct Cli {
    /// Path to the YAML job specification.
    pub config_file: PathBuf,

    /// Path to the log file the daemon and the REPL's `logs` command read.
    pub log_file: PathBuf,

    /// Minimum level of log line to emit.
    #[arg(value_enum, default_value = "info")]
    pub log_level: LogLevel,
}

/// The six syslog-style severities a supervisor's log level can be set to.
/// `tracing` has no `critical`/`notice` level, so both fold onto the
/// nearest standard one (see [`LogLevel::filter`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum LogLevel {
    Critical,
    Error,
    Warning,
    Notice,
    Info,
    Debug,
}

impl LogLevel {
    pub fn filter(self) -> tracing::level_filters::LevelFilter {
        use tracing::level_filters::LevelFilter;
        match self {
            LogLevel::Critical | LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warning => LevelFilter::WARN,
            LogLevel::Notice | LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
        }
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
