// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Top-level startup/reload failures, converted to the process exit code at
//! the `main` boundary. No error from the core ever crashes the supervisor
//! process; fatal outcomes are always routed through "stop everything, exit N".

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("failed to read config file {0:?}: {1}")]
    ConfigIo(PathBuf, #[source] std::io::Error),

    #[error(transparent)]
    Config(#[from] tm_core::ConfigError),

    #[error("failed to open log file {0:?}: {1}")]
    LogFile(PathBuf, #[source] std::io::Error),

    #[error("failed to install global log subscriber: {0}")]
    Logging(String),

    #[error("failed to install signal handler: {0}")]
    Signal(#[source] std::io::Error),

    #[error(transparent)]
    Engine(#[from] tm_engine::EngineError),
}
