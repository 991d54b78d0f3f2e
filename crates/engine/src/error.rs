// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no job with id {0}")]
    JobNotFound(u32),

    #[error("job {0} has no instance at index {1}")]
    InstanceNotFound(u32, u32),

    #[error(transparent)]
    Config(#[from] tm_core::ConfigError),
}
