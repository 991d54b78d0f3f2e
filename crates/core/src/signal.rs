// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! POSIX signal name table.

use crate::ConfigError;

pub use nix::sys::signal::Signal;

/// Resolve a signal name (`"SIGTERM"`, `"sigterm"`, `"TERM"`) to a [`Signal`].
///
/// Accepts both the bare name and the `SIG`-prefixed form, case
/// insensitively, covering the set a `stop_signal` field allows: HUP, INT,
/// QUIT, ILL, TRAP, ABRT, BUS, FPE, KILL, USR1, SEGV, USR2, PIPE, ALRM,
/// TERM, CHLD, CONT, STOP, TSTP, TTIN, TTOU.
pub fn parse(name: &str) -> Result<Signal, ConfigError> {
    let upper = name.to_ascii_uppercase();
    let bare = upper.strip_prefix("SIG").unwrap_or(&upper);
    let full = format!("SIG{bare}");
    full.parse::<Signal>()
        .map_err(|_| ConfigError::UnknownSignal(name.to_string()))
}

/// The lowercase, human-readable description POSIX `strsignal(3)` gives
/// for a signal, used only in operator-facing log lines such as "Sending
/// Signal interrupt" / "exited with status: signal: killed".
pub fn describe(signal: Signal) -> &'static str {
    match signal {
        Signal::SIGHUP => "hangup",
        Signal::SIGINT => "interrupt",
        Signal::SIGQUIT => "quit",
        Signal::SIGILL => "illegal instruction",
        Signal::SIGTRAP => "trace/breakpoint trap",
        Signal::SIGABRT => "aborted",
        Signal::SIGBUS => "bus error",
        Signal::SIGFPE => "floating point exception",
        Signal::SIGKILL => "killed",
        Signal::SIGUSR1 => "user defined signal 1",
        Signal::SIGSEGV => "segmentation fault",
        Signal::SIGUSR2 => "user defined signal 2",
        Signal::SIGPIPE => "broken pipe",
        Signal::SIGALRM => "alarm clock",
        Signal::SIGTERM => "terminated",
        Signal::SIGCHLD => "child exited",
        Signal::SIGCONT => "continued",
        Signal::SIGSTOP => "stopped (signal)",
        Signal::SIGTSTP => "stopped",
        Signal::SIGTTIN => "stopped (tty input)",
        Signal::SIGTTOU => "stopped (tty output)",
        _ => "unknown signal",
    }
}

/// Test whether `pid` is alive by sending the null signal (`kill(pid, 0)`).
///
/// This never actually delivers a signal; per `man 2 kill`, signal 0 is
/// used purely to check for the existence of the process (and group
/// membership/permission), which is exactly the liveness probe the
/// instance start-up gate needs.
pub fn probe(pid: nix::unistd::Pid) -> bool {
    nix::sys::signal::kill(pid, None).is_ok()
}

#[cfg(test)]
#[path = "signal_tests.rs"]
mod tests;
