// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tm_core::{ExitState, Signal};
use tokio::sync::Notify;

use crate::{ProcessAdapter, ProcessHandle, SpawnArgs, SpawnError};

/// One recorded `spawn` call, kept for assertions in engine tests.
#[derive(Debug, Clone)]
pub struct SpawnCall {
    pub command: Vec<String>,
    pub env_vars: Vec<(String, String)>,
}

/// A signal delivered to a process group, recorded for assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalCall {
    pub pgid: i32,
    pub signal: Signal,
}

struct FakeState {
    spawn_calls: Vec<SpawnCall>,
    signal_calls: Vec<SignalCall>,
    /// Exit states to hand out to each successive spawned child, in order;
    /// a child not yet given one blocks in `wait()` until the test resolves
    /// it (see [`FakeProcessHandle::resolve`]).
    scripted_exits: VecDeque<ExitState>,
    next_pid: i32,
    alive_pids: std::collections::HashSet<i32>,
    fail_next_spawn: bool,
    /// Live handles by pid, so a test holding only the adapter (not the
    /// handle a spawn call returned) can still resolve a specific child —
    /// needed to simulate a child honoring (or ignoring) a stop signal.
    handles_by_pid: std::collections::HashMap<i32, FakeProcessHandle>,
}

/// Fake process adapter: records what it was asked to do and hands back
/// [`FakeProcessHandle`]s whose exit the test controls directly, instead
/// of spawning anything.
#[derive(Clone)]
pub struct FakeProcessAdapter {
    inner: Arc<Mutex<FakeState>>,
}

impl Default for FakeProcessAdapter {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeState {
                spawn_calls: Vec::new(),
                signal_calls: Vec::new(),
                scripted_exits: VecDeque::new(),
                next_pid: 1000,
                alive_pids: std::collections::HashSet::new(),
                fail_next_spawn: false,
                handles_by_pid: std::collections::HashMap::new(),
            })),
        }
    }
}

impl FakeProcessAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn_calls(&self) -> Vec<SpawnCall> {
        self.inner.lock().spawn_calls.clone()
    }

    pub fn signal_calls(&self) -> Vec<SignalCall> {
        self.inner.lock().signal_calls.clone()
    }

    /// Queue the exit state the next spawned child will resolve to as soon
    /// as `wait()` is polled.
    pub fn push_exit(&self, state: ExitState) {
        self.inner.lock().scripted_exits.push_back(state);
    }

    /// Make the next `spawn` call fail instead of producing a handle.
    pub fn fail_next_spawn(&self) {
        self.inner.lock().fail_next_spawn = true;
    }

    /// Resolve the still-running child with this pid, as if it had just
    /// exited. A no-op if no live handle has that pid (already resolved,
    /// or never spawned).
    pub fn resolve_pid(&self, pid: i32, state: ExitState) {
        if let Some(handle) = self.inner.lock().handles_by_pid.get(&pid).cloned() {
            handle.resolve(state);
        }
    }
}

#[async_trait]
impl ProcessAdapter for FakeProcessAdapter {
    type Handle = FakeProcessHandle;

    async fn spawn(&self, args: &SpawnArgs) -> Result<Self::Handle, SpawnError> {
        let mut state = self.inner.lock();
        if state.fail_next_spawn {
            state.fail_next_spawn = false;
            return Err(SpawnError::Exec {
                command: args.command.clone(),
                source: std::io::Error::other("fake spawn failure"),
            });
        }
        state.spawn_calls.push(SpawnCall {
            command: args.command.clone(),
            env_vars: args.env_vars.clone(),
        });
        let pid = state.next_pid;
        state.next_pid += 1;
        state.alive_pids.insert(pid);
        let scripted = state.scripted_exits.pop_front();
        drop(state);

        let handle = FakeProcessHandle {
            pid,
            exit: Arc::new(Mutex::new(scripted)),
            notify: Arc::new(Notify::new()),
            alive: self.inner.clone(),
        };
        self.inner.lock().handles_by_pid.insert(pid, handle.clone());
        if let Some(state) = scripted {
            handle.resolve(state);
        }
        Ok(handle)
    }

    fn signal_group(&self, pgid: i32, signal: Signal) -> Result<(), SpawnError> {
        self.inner
            .lock()
            .signal_calls
            .push(SignalCall { pgid, signal });
        Ok(())
    }

    fn probe(&self, pid: i32) -> bool {
        self.inner.lock().alive_pids.contains(&pid)
    }
}

/// A handle to a fake child process. Tests resolve its exit with
/// [`resolve`](Self::resolve); `wait()` blocks until that happens.
#[derive(Clone)]
pub struct FakeProcessHandle {
    pid: i32,
    exit: Arc<Mutex<Option<ExitState>>>,
    notify: Arc<Notify>,
    alive: Arc<Mutex<FakeState>>,
}

impl FakeProcessHandle {
    /// Resolve this child's exit, waking any waiter and marking it dead for
    /// future `probe` calls.
    pub fn resolve(&self, state: ExitState) {
        let mut exit = self.exit.lock();
        if exit.is_none() {
            *exit = Some(state);
            self.alive.lock().alive_pids.remove(&self.pid);
            self.notify.notify_waiters();
        }
    }
}

#[async_trait]
impl ProcessHandle for FakeProcessHandle {
    fn pid(&self) -> i32 {
        self.pid
    }

    async fn wait(&mut self) -> Result<ExitState, SpawnError> {
        loop {
            if let Some(state) = *self.exit.lock() {
                return Ok(state);
            }
            let notified = self.notify.notified();
            if let Some(state) = *self.exit.lock() {
                return Ok(state);
            }
            notified.await;
        }
    }

    fn try_wait(&mut self) -> Result<Option<ExitState>, SpawnError> {
        Ok(*self.exit.lock())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
