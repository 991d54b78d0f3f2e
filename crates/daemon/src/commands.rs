// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The one channel both control paths enqueue onto: the REPL and the
//! signal handler both feed the same command queue into the supervisor.

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

#[derive(Debug)]
pub enum DaemonCommand {
    StartJob(u32, bool),
    StopJob(u32),
    StartAll(bool),
    StopAll(bool),
    Reload,
    Shutdown,
}

/// Cheaply cloneable handle to the command queue, handed to the REPL task
/// and the signal-listener task alike.
#[derive(Clone)]
pub struct Control {
    tx: UnboundedSender<DaemonCommand>,
}

impl Control {
    pub fn channel() -> (Self, UnboundedReceiver<DaemonCommand>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Enqueue `cmd`. The receiving end outlives every sender for the life
    /// of the process, so a dropped-receiver send error can't occur in
    /// practice; it is swallowed rather than propagated, matching the
    /// "finished" notification's drop-if-no-receiver semantics elsewhere in
    /// this codebase.
    pub fn send(&self, cmd: DaemonCommand) {
        let _ = self.tx.send(cmd);
    }
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
