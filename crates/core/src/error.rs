// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error taxonomy shared by config parsing and the engine.

use thiserror::Error;

/// Failures that can occur while validating a raw job configuration entry.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("job {0}: missing required field `{1}`")]
    MissingField(u32, &'static str),

    #[error("job id {0:?} is not a valid non-negative integer")]
    InvalidId(String),

    #[error("job {0}: `instances` must be a positive integer, got {1:?}")]
    InvalidInstanceCount(u32, String),

    #[error("job {0}: `{1}` is not a valid integer: {2:?}")]
    InvalidInteger(u32, &'static str, String),

    #[error("unknown signal name: {0:?}")]
    UnknownSignal(String),

    #[error("job {0}: unknown restart policy {1:?} (expected always, never, or unexpected)")]
    InvalidRestartPolicy(u32, String),

    #[error("job {0}: `stop_timeout` must be at least 1 second, got {1}")]
    StopTimeoutTooShort(u32, u64),

    #[error("duplicate job id {0}")]
    DuplicateId(u32),

    #[error("job {0}: command must not be empty")]
    EmptyCommand(u32),

    #[error("failed to read config file {0:?}: {1}")]
    Io(String, String),

    #[error("failed to parse YAML config: {0}")]
    Yaml(String),
}
