// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reads the YAML job config off disk and hands it to `tm-core`'s parse
//! table; this module is nothing more than that read step.

use std::path::Path;

use tm_core::JobConfig;

use crate::error::DaemonError;

pub fn load(path: &Path, inherited_umask: u32) -> Result<Vec<JobConfig>, DaemonError> {
    let yaml = std::fs::read_to_string(path).map_err(|e| DaemonError::ConfigIo(path.to_path_buf(), e))?;
    Ok(tm_core::parse_all(&yaml, inherited_umask)?)
}

#[cfg(test)]
#[path = "config_loader_tests.rs"]
mod tests;
