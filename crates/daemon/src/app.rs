// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ties the engine to its external collaborators: loads the initial config,
//! installs logging and signal handling, runs the REPL, and drives the
//! command queue until shutdown.

use std::sync::Arc;

use tm_core::SystemClock;
use tm_engine::Supervisor;
use tm_process::RealProcessAdapter;

use crate::cli::Cli;
use crate::commands::{Control, DaemonCommand};
use crate::{config_loader, logging, signals};

type AppSupervisor = Supervisor<RealProcessAdapter, SystemClock>;

/// Runs the daemon to completion and returns the process exit code: 0 on
/// clean shutdown, 1 on fatal config error at startup or during reload.
pub async fn run(cli: Cli) -> i32 {
    let inherited_umask = tm_process::inherited_umask();

    let configs = match config_loader::load(&cli.config_file, inherited_umask) {
        Ok(configs) => configs,
        Err(err) => {
            eprintln!("taskmaster: {err}");
            return 1;
        }
    };

    let _log_guard = match logging::init(&cli.log_file, cli.log_level) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("taskmaster: {err}");
            return 1;
        }
    };

    tracing::info!(jobs = configs.len(), "taskmaster starting");

    let supervisor = Arc::new(AppSupervisor::new(RealProcessAdapter::new(), SystemClock));
    supervisor.reload(configs, true).await;

    let (control, mut commands) = Control::channel();

    if let Err(err) = signals::install(control.clone()) {
        tracing::error!(error = %err, "failed to install signal handlers");
        return 1;
    }

    tokio::spawn(crate::repl::run(
        Arc::clone(&supervisor),
        control,
        cli.log_file.clone(),
    ));

    loop {
        let Some(command) = commands.recv().await else {
            tracing::warn!("command queue closed unexpectedly, shutting down");
            supervisor.wait_for_exit().await;
            return 0;
        };

        match command {
            DaemonCommand::StartJob(id, wait) => {
                if let Err(err) = supervisor.start_job(id, wait).await {
                    tracing::warn!(error = %err, "start failed");
                }
            }
            DaemonCommand::StopJob(id) => {
                if let Err(err) = supervisor.stop_job(id).await {
                    tracing::warn!(error = %err, "stop failed");
                }
            }
            DaemonCommand::StartAll(wait) => supervisor.start_all_jobs(wait).await,
            DaemonCommand::StopAll(wait) => supervisor.stop_all_jobs(wait).await,
            DaemonCommand::Reload => match config_loader::load(&cli.config_file, inherited_umask) {
                Ok(configs) => {
                    let outcome = supervisor.reload(configs, true).await;
                    tracing::info!(
                        current = outcome.current.len(),
                        changed = outcome.changed.len(),
                        new = outcome.new.len(),
                        old = outcome.old.len(),
                        "reload complete"
                    );
                }
                Err(err) => {
                    // A reload that fails to parse stops everything and exits
                    // rather than keep the previous config running unconfirmed.
                    tracing::error!(error = %err, "reload failed, stopping all jobs");
                    supervisor.wait_for_exit().await;
                    return 1;
                }
            },
            DaemonCommand::Shutdown => {
                tracing::info!("shutting down");
                supervisor.wait_for_exit().await;
                return 0;
            }
        }
    }
}
