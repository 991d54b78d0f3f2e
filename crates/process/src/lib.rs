// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! tm-process: the OS boundary. Spawns child programs, waits for their
//! exit, and delivers signals, behind an adapter trait so the engine can
//! be driven against a fake in tests.

mod real;
mod spawn_args;

pub use real::{inherited_umask, RealProcessAdapter};
pub use spawn_args::SpawnArgs;

use async_trait::async_trait;
use thiserror::Error;
use tm_core::{ExitState, Signal};

/// Errors from spawning or signaling a child process.
#[derive(Debug, Error)]
pub enum SpawnError {
    #[error("failed to open redirection target {0:?}: {1}")]
    Redirection(std::path::PathBuf, std::io::Error),

    #[error("failed to spawn {command:?}: {source}")]
    Exec {
        command: Vec<String>,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to signal pid {0}: {1}")]
    Signal(i32, std::io::Error),

    #[error("failed to wait on child: {0}")]
    Wait(std::io::Error),
}

/// A handle to a spawned child, abstract over the real OS process and a
/// fake used in tests.
#[async_trait]
pub trait ProcessHandle: Send + Sync + 'static {
    /// The child's process id (also its process group id, since every
    /// child is launched into its own new group).
    fn pid(&self) -> i32;

    /// Block until the child exits, returning how it exited.
    async fn wait(&mut self) -> Result<ExitState, SpawnError>;

    /// Attempt to reap the child without blocking; `None` if still running.
    fn try_wait(&mut self) -> Result<Option<ExitState>, SpawnError>;
}

/// Adapter for the process-lifecycle operations an instance needs: spawn,
/// wait, signal, probe.
#[async_trait]
pub trait ProcessAdapter: Clone + Send + Sync + 'static {
    type Handle: ProcessHandle;

    /// Launch a child into its own new process group, wiring up the
    /// requested redirections, environment, working directory, and umask.
    async fn spawn(&self, args: &SpawnArgs) -> Result<Self::Handle, SpawnError>;

    /// Send `signal` to the child's entire process group (negative pid),
    /// matching the supervisor's "stop the whole group, not just the
    /// tracked pid" semantics.
    fn signal_group(&self, pgid: i32, signal: Signal) -> Result<(), SpawnError>;

    /// Test whether `pid` is still alive (signal 0 probe).
    fn probe(&self, pid: i32) -> bool;
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
pub mod fake;

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeProcessAdapter, FakeProcessHandle, SpawnCall};
