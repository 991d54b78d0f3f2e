// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A single supervised instance of a job: one process slot, its current
//! lifecycle status, and the task that drives it through spawn, dwell
//! checkup, running, and eventual exit or restart.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tm_core::{describe_signal, Clock, ExitState, InstanceStatus, JobConfig, Latch};
use tm_process::{ProcessAdapter, ProcessHandle, SpawnArgs, SpawnError};
use tokio::sync::{Notify, RwLock};

const CHECKUP_POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy)]
struct RunState {
    status: InstanceStatus,
    pid: Option<i32>,
    /// When this instance last settled into `Running`. Reconcile's
    /// idempotence/minimality properties (spec.md §8) are stated directly in
    /// terms of this field: a job left untouched by a reload must see it
    /// unchanged.
    start_time: Option<Instant>,
    /// When this instance last settled into a terminal, non-active status
    /// (`Stopped` or `Exited`) after having run.
    stop_time: Option<Instant>,
}

/// One supervised process slot. `P` is the process adapter (real or fake),
/// `C` the clock used for start-duration logging.
pub struct Instance<P: ProcessAdapter, C: Clock> {
    pub job_id: u32,
    pub index: u32,
    config: Arc<JobConfig>,
    process: P,
    clock: C,
    state: RwLock<RunState>,
    /// Count of launch attempts made since the current call to `start()`,
    /// shared across the failed-launch-retry path and the
    /// exited-then-restarted path: both are bounded by the same
    /// `max_restarts` budget, counting the very first launch as attempt one
    /// and allowing `max_restarts + 1` total launches.
    restarts: AtomicU32,
    stop_requested: AtomicBool,
    finished: Arc<Notify>,
}

impl<P: ProcessAdapter, C: Clock> Instance<P, C> {
    pub fn new(job_id: u32, index: u32, config: Arc<JobConfig>, process: P, clock: C) -> Arc<Self> {
        Arc::new(Self {
            job_id,
            index,
            config,
            process,
            clock,
            state: RwLock::new(RunState {
                status: InstanceStatus::Stopped,
                pid: None,
                start_time: None,
                stop_time: None,
            }),
            restarts: AtomicU32::new(0),
            stop_requested: AtomicBool::new(false),
            finished: Arc::new(Notify::new()),
        })
    }

    pub async fn status(&self) -> InstanceStatus {
        self.state.read().await.status
    }

    pub async fn pid(&self) -> Option<i32> {
        self.state.read().await.pid
    }

    /// When this instance last settled into `Running`. `None` if it has
    /// never been running. Used to verify that reconcile leaves untouched
    /// jobs' instances undisturbed (spec.md §8).
    pub async fn start_time(&self) -> Option<Instant> {
        self.state.read().await.start_time
    }

    /// When this instance last settled into a terminal, non-active status
    /// after having run. `None` if it has never stopped.
    pub async fn stop_time(&self) -> Option<Instant> {
        self.state.read().await.stop_time
    }

    pub fn restarts(&self) -> u32 {
        self.restarts.load(Ordering::Acquire)
    }

    fn spawn_args(&self) -> SpawnArgs {
        SpawnArgs {
            command: self.config.command.clone(),
            env_vars: self.config.env_vars.clone(),
            working_dir: self.config.working_dir.clone(),
            umask: self.config.umask,
            redirections: self.config.redirections.clone(),
        }
    }

    /// Begin (or resume) supervising this instance: spawns the task that
    /// drives it through the start-up gate and, on settling into `Running`,
    /// through to eventual exit and restart-policy evaluation.
    ///
    /// Returns a [`Latch`] that resolves once the very first launch attempt
    /// has either reached `Running` or given up as `StartFailed`. When
    /// `wait` is true the caller blocks on that latch before returning. If
    /// the instance is already starting, this call does not disturb the
    /// supervise loop already in flight (§4.1 tie-break).
    pub async fn start(self: &Arc<Self>, wait: bool) -> Latch {
        {
            let mut state = self.state.write().await;
            if state.status.is_active() {
                let latch = Latch::new();
                latch.resolve();
                return latch;
            }
            state.status = InstanceStatus::Starting;
            state.pid = None;
        }
        self.stop_requested.store(false, Ordering::Release);
        self.restarts.store(0, Ordering::Release);

        let latch = Latch::new();
        let this = Arc::clone(self);
        let task_latch = latch.clone();
        tokio::spawn(async move {
            this.supervise_loop(task_latch).await;
        });

        if wait {
            latch.wait().await;
        }
        latch
    }

    /// Whether the next launch attempt (attempt number `next_attempt`,
    /// 1-based, counted since the current call to `start()`) is within the
    /// `max_restarts` budget. Applies uniformly to failed-launch retries
    /// and to restarting after a successful run exits.
    fn attempt_allowed(&self, next_attempt: u32) -> bool {
        next_attempt <= self.config.max_restarts + 1
    }

    /// Drives one instance end to end: spawn, optional dwell checkup,
    /// running, exit, and restart-policy evaluation, looping back to a
    /// fresh launch attempt whenever policy or the retry budget calls for
    /// it. `restarts` counts every launch attempt made since the current
    /// `start()` call, whatever triggered it.
    async fn supervise_loop(self: Arc<Self>, start_latch: Latch) {
        let mut start_latch = Some(start_latch);
        loop {
            let attempt = self.restarts.fetch_add(1, Ordering::AcqRel) + 1;
            {
                let mut state = self.state.write().await;
                state.status = InstanceStatus::Starting;
            }

            let mut handle = match self.process.spawn(&self.spawn_args()).await {
                Ok(handle) => handle,
                Err(err) => {
                    tracing::warn!(
                        job_id = self.job_id,
                        index = self.index,
                        attempt,
                        "failed to start with error: {err}"
                    );
                    if !self.attempt_allowed(attempt + 1) {
                        self.enter_start_failed(ExitState::Unknown, start_latch.take())
                            .await;
                        return;
                    }
                    self.enter_backoff().await;
                    continue;
                }
            };

            {
                let mut state = self.state.write().await;
                state.pid = Some(handle.pid());
            }

            if let Some(died_as) = self.run_checkup(&mut handle).await {
                if !self.attempt_allowed(attempt + 1) {
                    self.enter_start_failed(died_as, start_latch.take()).await;
                    return;
                }
                self.enter_backoff().await;
                continue;
            }

            {
                let mut state = self.state.write().await;
                state.status = InstanceStatus::Running;
                state.start_time = Some(self.clock.now());
            }
            tracing::info!(
                job_id = self.job_id,
                index = self.index,
                "Successfully Started after {} second(s)",
                self.config.start_checkup_secs
            );
            if let Some(latch) = start_latch.take() {
                latch.resolve();
            }

            let exit = handle.wait().await.unwrap_or(ExitState::Unknown);
            {
                let mut state = self.state.write().await;
                state.pid = None;
            }

            self.log_exit(exit);

            if self.stop_requested.load(Ordering::Acquire) {
                tracing::info!(job_id = self.job_id, index = self.index, "stopped by user, not restarting");
                self.settle(InstanceStatus::Stopped).await;
                return;
            }

            if self.restart_policy_wants_restart(exit) {
                if !self.attempt_allowed(attempt + 1) {
                    self.settle(InstanceStatus::Exited(exit)).await;
                    return;
                }
                if let ExitState::Code(code) = exit {
                    tracing::info!(
                        job_id = self.job_id,
                        index = self.index,
                        code,
                        "Encountered unexpected exit code {code}, restarting"
                    );
                }
                tokio::task::yield_now().await;
                continue;
            }

            self.settle(InstanceStatus::Exited(exit)).await;
            return;
        }
    }

    fn log_exit(&self, exit: ExitState) {
        match exit {
            ExitState::Code(code) => {
                tracing::info!(job_id = self.job_id, index = self.index, code, "exited with status: exit status {code}");
            }
            ExitState::Signaled(sig) => {
                let name = describe_signal(sig);
                tracing::info!(job_id = self.job_id, index = self.index, %sig, "exited with status: signal: {name}");
            }
            ExitState::Unknown => {
                tracing::warn!(job_id = self.job_id, index = self.index, "exited with unknown status");
            }
        }
    }

    /// Polls `try_wait` every 100ms for up to `start_checkup_secs`. Returns
    /// `None` when there is no checkup configured (immediate, unconditional
    /// success) or the
    /// process survives the dwell window; `Some(exit)` if it died first.
    async fn run_checkup(&self, handle: &mut P::Handle) -> Option<ExitState> {
        let dwell = self.config.start_checkup_secs;
        if dwell == 0 {
            return None;
        }
        let ticks = (Duration::from_secs(dwell).as_millis() / CHECKUP_POLL_INTERVAL.as_millis())
            .max(1) as u32;
        for _ in 0..ticks {
            tokio::time::sleep(CHECKUP_POLL_INTERVAL).await;
            if let Ok(Some(exit)) = handle.try_wait() {
                tracing::warn!(job_id = self.job_id, index = self.index, ?exit, "exited during start checkup");
                return Some(exit);
            }
        }
        None
    }

    async fn enter_start_failed(&self, exit: ExitState, start_latch: Option<Latch>) {
        tracing::warn!(job_id = self.job_id, index = self.index, "Creation failed");
        {
            let mut state = self.state.write().await;
            state.status = InstanceStatus::StartFailed(exit);
            state.pid = None;
        }
        if let Some(latch) = start_latch {
            latch.resolve();
        }
        self.finished.notify_waiters();
    }

    async fn enter_backoff(&self) {
        {
            let mut state = self.state.write().await;
            state.status = InstanceStatus::Backoff;
            state.pid = None;
        }
        tokio::task::yield_now().await;
    }

    fn restart_policy_wants_restart(&self, exit: ExitState) -> bool {
        use tm_core::RestartPolicy::*;
        match self.config.restart_policy {
            Always => true,
            Never => false,
            Unexpected => exit.code() != Some(self.config.expected_exit),
        }
    }

    async fn settle(&self, status: InstanceStatus) {
        {
            let mut state = self.state.write().await;
            state.status = status;
            state.pid = None;
            state.stop_time = Some(self.clock.now());
        }
        self.finished.notify_waiters();
    }

    /// Stop this instance: signal its process group, then race the
    /// configured timeout against the instance actually finishing,
    /// escalating to SIGKILL if the timeout wins.
    pub async fn stop(self: &Arc<Self>, wait: bool) {
        let pid = {
            let mut state = self.state.write().await;
            if !state.status.is_active() {
                return;
            }
            state.status = InstanceStatus::Stopping;
            state.pid
        };
        self.stop_requested.store(true, Ordering::Release);

        let Some(pid) = pid else {
            self.settle(InstanceStatus::Stopped).await;
            return;
        };

        if let Some(signal) = self.config.stop_signal {
            if let Err(err) = self.process.signal_group(-pid, signal) {
                tracing::warn!(job_id = self.job_id, index = self.index, error = %err, "Sending Signal failed");
            } else {
                tracing::info!(
                    job_id = self.job_id,
                    index = self.index,
                    "Sending Signal {}",
                    describe_signal(signal)
                );
            }
        }

        let this = Arc::clone(self);
        let waiter = tokio::spawn(async move { this.stop_timeout(pid).await });

        if wait {
            let _ = waiter.await;
        }
    }

    async fn stop_timeout(self: Arc<Self>, pid: i32) {
        let timeout = Duration::from_secs(self.config.stop_timeout_secs);

        // `enable()` registers this future as a waiter immediately, so a
        // `finished` notification fired between the two status checks below
        // is not lost the way it would be if we only subscribed once we
        // started polling inside `timeout(...)`.
        let notified = self.finished.notified();
        tokio::pin!(notified);
        notified.as_mut().enable();

        if self.status().await.is_terminal() {
            return;
        }

        if tokio::time::timeout(timeout, notified).await.is_ok() {
            return;
        }

        tracing::warn!(
            job_id = self.job_id,
            index = self.index,
            timeout_secs = self.config.stop_timeout_secs,
            "did not stop after timeout of {} seconds SIGKILL issued",
            self.config.stop_timeout_secs
        );
        if let Err(err) = self.process.signal_group(-pid, tm_core::Signal::SIGKILL) {
            tracing::warn!(job_id = self.job_id, index = self.index, error = %err, "SIGKILL failed");
        }

        self.finished.notified().await;
    }
}

#[cfg(test)]
#[path = "instance_tests.rs"]
mod tests;
