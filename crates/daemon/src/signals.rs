// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! SIGHUP/SIGINT/SIGTERM listener for the supervisor.
//! Registration happens synchronously so a failure to install a handler is
//! a startup error rather than a silently-dead background task; the actual
//! receive loop then runs as its own task for the life of the process.

use tokio::signal::unix::{signal, SignalKind};

use crate::commands::{Control, DaemonCommand};
use crate::error::DaemonError;

pub fn install(control: Control) -> Result<(), DaemonError> {
    let mut hangup = signal(SignalKind::hangup()).map_err(DaemonError::Signal)?;
    let mut interrupt = signal(SignalKind::interrupt()).map_err(DaemonError::Signal)?;
    let mut terminate = signal(SignalKind::terminate()).map_err(DaemonError::Signal)?;

    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = hangup.recv() => {
                    tracing::info!("received SIGHUP, reloading config");
                    control.send(DaemonCommand::Reload);
                }
                _ = interrupt.recv() => {
                    tracing::info!("received SIGINT, stopping all jobs");
                    control.send(DaemonCommand::Shutdown);
                    return;
                }
                _ = terminate.recv() => {
                    tracing::info!("received SIGTERM, stopping all jobs");
                    control.send(DaemonCommand::Shutdown);
                    return;
                }
            }
        }
    });

    Ok(())
}

#[cfg(test)]
#[path = "signals_tests.rs"]
mod tests;
