// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::fs::OpenOptions;
use std::os::unix::process::ExitStatusExt;
use std::process::Stdio;
use std::sync::Arc;

use async_trait::async_trait;
use nix::sys::stat::Mode;
use nix::unistd::Pid;
use parking_lot::Mutex as SyncMutex;
use tm_core::{ExitState, Signal};
use tokio::process::{Child, Command};

use crate::{ProcessAdapter, ProcessHandle, SpawnArgs, SpawnError};

/// Process adapter backed by real `tokio::process::Command` children.
///
/// Every launch creates a brand new process group (`process_group(0)`)
/// rather than relying on the child inheriting a usable one, so a stop
/// signal sent to the group always reaches every descendant.
#[derive(Clone, Default)]
pub struct RealProcessAdapter {
    /// Serializes the umask-set / spawn / umask-restore critical section
    /// across concurrent launches, so one job's requested umask never
    /// leaks into another job's simultaneous spawn.
    launch_lock: Arc<SyncMutex<()>>,
}

/// Read the umask this process inherited from its parent shell, for jobs
/// that don't configure their own. Umask is process-wide and has no query
/// syscall, so the only way to read it is the classic set/restore round
/// trip (`man 2 umask`) — done once at daemon startup rather than bracketing
/// every launch, since a launch-time bracket would race concurrent spawns.
pub fn inherited_umask() -> u32 {
    let current = nix::sys::stat::umask(Mode::from_bits_truncate(0o022));
    let _ = nix::sys::stat::umask(current);
    current.bits()
}

impl RealProcessAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    fn open_redirection(path: &std::path::Path, for_write: bool) -> Result<std::fs::File, SpawnError> {
        let mut opts = OpenOptions::new();
        if for_write {
            opts.create(true).truncate(true).write(true);
        } else {
            opts.read(true);
        }
        opts.open(path)
            .map_err(|e| SpawnError::Redirection(path.to_path_buf(), e))
    }
}

#[async_trait]
impl ProcessAdapter for RealProcessAdapter {
    type Handle = RealProcessHandle;

    async fn spawn(&self, args: &SpawnArgs) -> Result<Self::Handle, SpawnError> {
        let stdin = match &args.redirections.stdin {
            Some(path) => Stdio::from(Self::open_redirection(path, false)?),
            None => Stdio::inherit(),
        };
        let stdout = match &args.redirections.stdout {
            Some(path) => Stdio::from(Self::open_redirection(path, true)?),
            None => Stdio::inherit(),
        };
        let stderr = match &args.redirections.stderr {
            Some(path) => Stdio::from(Self::open_redirection(path, true)?),
            None => Stdio::inherit(),
        };

        let mut cmd = Command::new(&args.command[0]);
        cmd.args(&args.command[1..])
            .stdin(stdin)
            .stdout(stdout)
            .stderr(stderr)
            .envs(args.env_vars.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .process_group(0);
        if let Some(dir) = &args.working_dir {
            cmd.current_dir(dir);
        }

        let child = {
            let _guard = self.launch_lock.lock();
            let prev = nix::sys::stat::umask(Mode::from_bits_truncate(args.umask));
            let spawned = cmd.spawn();
            let _ = nix::sys::stat::umask(prev);
            spawned.map_err(|source| SpawnError::Exec {
                command: args.command.clone(),
                source,
            })?
        };

        Ok(RealProcessHandle { child })
    }

    fn signal_group(&self, pgid: i32, signal: Signal) -> Result<(), SpawnError> {
        // `pgid` is already negative (targeting the whole group); plain
        // `kill(2)` accepts that natively, unlike `killpg(2)` which expects
        // a positive pgrp and negates it internally.
        nix::sys::signal::kill(Pid::from_raw(pgid), signal)
            .map_err(|errno| SpawnError::Signal(pgid, std::io::Error::from(errno)))
    }

    fn probe(&self, pid: i32) -> bool {
        tm_core::probe_pid(Pid::from_raw(pid))
    }
}

pub struct RealProcessHandle {
    child: Child,
}

fn exit_state_from(status: std::process::ExitStatus) -> ExitState {
    if let Some(code) = status.code() {
        ExitState::Code(code)
    } else if let Some(signal) = status.signal() {
        match Signal::try_from(signal) {
            Ok(sig) => ExitState::Signaled(sig),
            Err(_) => ExitState::Unknown,
        }
    } else {
        ExitState::Unknown
    }
}

#[async_trait]
impl ProcessHandle for RealProcessHandle {
    fn pid(&self) -> i32 {
        self.child.id().map(|p| p as i32).unwrap_or(-1)
    }

    async fn wait(&mut self) -> Result<ExitState, SpawnError> {
        let status = self.child.wait().await.map_err(SpawnError::Wait)?;
        Ok(exit_state_from(status))
    }

    fn try_wait(&mut self) -> Result<Option<ExitState>, SpawnError> {
        match self.child.try_wait().map_err(SpawnError::Wait)? {
            Some(status) => Ok(Some(exit_state_from(status))),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
#[path = "real_tests.rs"]
mod tests;
