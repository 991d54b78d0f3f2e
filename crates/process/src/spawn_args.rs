// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use tm_core::Redirections;

/// Everything needed to launch one instance's child process.
#[derive(Debug, Clone)]
pub struct SpawnArgs {
    pub command: Vec<String>,
    pub env_vars: Vec<(String, String)>,
    pub working_dir: Option<PathBuf>,
    pub umask: u32,
    pub redirections: Redirections,
}
