// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Line-oriented REPL on stdin. Queries (`ps`, `logs`,
//! `help`) read the supervisor/log file directly; mutating commands
//! (`start`, `stop`, `startall`, `stopall`, `reload`, `exit`) go through the
//! same [`Control`] queue the signal handler uses.

use std::path::PathBuf;
use std::sync::Arc;

use tm_core::Clock;
use tm_engine::Supervisor;
use tm_process::ProcessAdapter;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::commands::{Control, DaemonCommand};

const HELP: &str = "\
commands: ps | logs | clear | start <id> | stop <id> | startall | stopall | reload | help | exit";

pub async fn run<P, C>(supervisor: Arc<Supervisor<P, C>>, control: Control, log_file: PathBuf)
where
    P: ProcessAdapter,
    C: Clock,
{
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => {
                control.send(DaemonCommand::Shutdown);
                return;
            }
            Err(err) => {
                tracing::warn!(error = %err, "error reading from stdin, shutting down REPL");
                return;
            }
        };

        let mut tokens = line.split_whitespace();
        let Some(command) = tokens.next() else { continue };
        let arg = tokens.next();

        match command.to_ascii_lowercase().as_str() {
            "ps" => print_ps(&supervisor).await,
            "logs" => print_logs(&log_file),
            "clear" => print!("\x1B[2J\x1B[H"),
            "help" => println!("{HELP}"),
            "start" => match parse_id(arg, &supervisor) {
                Ok(id) => control.send(DaemonCommand::StartJob(id, true)),
                Err(msg) => println!("{msg}"),
            },
            "stop" => match parse_id(arg, &supervisor) {
                Ok(id) => control.send(DaemonCommand::StopJob(id)),
                Err(msg) => println!("{msg}"),
            },
            "startall" => control.send(DaemonCommand::StartAll(true)),
            "stopall" => control.send(DaemonCommand::StopAll(true)),
            "reload" => control.send(DaemonCommand::Reload),
            "exit" => {
                control.send(DaemonCommand::Shutdown);
                return;
            }
            other => println!("unknown command {other:?}; {HELP}"),
        }
    }
}

fn parse_id<P, C>(arg: Option<&str>, supervisor: &Supervisor<P, C>) -> Result<u32, String>
where
    P: ProcessAdapter,
    C: Clock,
{
    let mut ids = supervisor.manager().ids();
    ids.sort_unstable();

    let Some(raw) = arg else {
        return Err(format!("usage: <command> <id>  (valid ids: {ids:?})"));
    };
    raw.parse::<u32>()
        .map_err(|_| format!("{raw:?} is not a valid job id (valid ids: {ids:?})"))
}

async fn print_ps<P, C>(supervisor: &Supervisor<P, C>)
where
    P: ProcessAdapter,
    C: Clock,
{
    println!("{:<8}{:<10}{:<10}{:<12}", "ID", "Instance", "PID", "Status");
    let mut ids = supervisor.manager().ids();
    ids.sort_unstable();
    for id in ids {
        let Some(job) = supervisor.get_job(id) else { continue };
        for instance in &job.instances {
            let pid = instance
                .pid()
                .await
                .map(|p| p.to_string())
                .unwrap_or_else(|| "-".to_string());
            let status = instance.status().await;
            println!("{:<8}{:<10}{:<10}{:<12}", id, instance.index, pid, status);
        }
    }
}

fn print_logs(log_file: &std::path::Path) {
    match std::fs::read_to_string(log_file) {
        Ok(contents) => print!("{contents}"),
        Err(err) => println!("could not read log file {log_file:?}: {err}"),
    }
}

#[cfg(test)]
#[path = "repl_tests.rs"]
mod tests;
