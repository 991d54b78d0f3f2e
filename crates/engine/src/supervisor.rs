// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The supervisor: owns the [`Manager`], performs reconcile (diff + apply)
//! against a freshly parsed config set, and exposes the public start/stop/
//! reload operations the REPL and signal handler drive.

use std::sync::Arc;

use tm_core::{Clock, JobConfig};
use tm_process::ProcessAdapter;
use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinSet;

use crate::error::EngineError;
use crate::job::Job;
use crate::manager::Manager;

/// Which bucket each incoming job fell into during a [`Supervisor::reload`]
/// classification, for observability and testing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReloadOutcome {
    /// Ids retained as-is: config was bit-identical, running instances left
    /// untouched.
    pub current: Vec<u32>,
    /// Ids whose config changed: old instances stopped, new ones started.
    pub changed: Vec<u32>,
    /// Ids not previously known to the manager.
    pub new: Vec<u32>,
    /// Ids present before reload but absent from the incoming set: stopped
    /// and dropped.
    pub old: Vec<u32>,
}

pub struct Supervisor<P: ProcessAdapter, C: Clock> {
    manager: Manager<P, C>,
    process: P,
    clock: C,
    /// Serializes `reload` against concurrent reloads. Held across the
    /// `.await` points in stop/start fan-out, hence the async-aware
    /// `tokio::sync::Mutex` rather than `parking_lot`.
    reload_lock: AsyncMutex<()>,
}

impl<P: ProcessAdapter, C: Clock> Supervisor<P, C> {
    pub fn new(process: P, clock: C) -> Self {
        Self {
            manager: Manager::new(),
            process,
            clock,
            reload_lock: AsyncMutex::new(()),
        }
    }

    pub fn manager(&self) -> &Manager<P, C> {
        &self.manager
    }

    pub fn has_job(&self, id: u32) -> bool {
        self.manager.has(id)
    }

    pub fn get_job(&self, id: u32) -> Option<Arc<Job<P, C>>> {
        self.manager.get(id)
    }

    pub fn for_all_jobs(&self, f: impl FnMut(&Job<P, C>)) {
        self.manager.for_each(f);
    }

    pub async fn start_job(&self, id: u32, wait: bool) -> Result<(), EngineError> {
        let job = self.manager.get(id).ok_or(EngineError::JobNotFound(id))?;
        job.start(wait).await;
        Ok(())
    }

    pub async fn stop_job(&self, id: u32) -> Result<(), EngineError> {
        let job = self.manager.get(id).ok_or(EngineError::JobNotFound(id))?;
        job.stop(true).await;
        Ok(())
    }

    /// Start every registered job concurrently; returns once every job's
    /// own `start(wait)` call has returned.
    pub async fn start_all_jobs(&self, wait: bool) {
        let mut jobs = Vec::new();
        let ids = self.manager.ids();
        for id in ids {
            if let Some(job) = self.manager.get(id) {
                jobs.push(job);
            }
        }

        let mut set = JoinSet::new();
        for job in jobs {
            set.spawn(async move { job.start(wait).await });
        }
        while set.join_next().await.is_some() {}
    }

    /// Stop every registered job concurrently; returns once every job's own
    /// `stop(wait)` call has returned.
    pub async fn stop_all_jobs(&self, wait: bool) {
        let ids = self.manager.ids();
        let mut set = JoinSet::new();
        for id in ids {
            if let Some(job) = self.manager.get(id) {
                set.spawn(async move { job.stop(wait).await });
            }
        }
        while set.join_next().await.is_some() {}
    }

    /// Equivalent to `stop_all_jobs(true)`; used during shutdown.
    pub async fn wait_for_exit(&self) {
        self.stop_all_jobs(true).await;
    }

    /// Classify `configs` against the current manager contents, apply the
    /// minimal disruption (§4.5), and report the classification.
    pub async fn reload(&self, configs: Vec<JobConfig>, wait: bool) -> ReloadOutcome {
        let _guard = self.reload_lock.lock().await;

        let mut outcome = ReloadOutcome::default();
        let mut current = Vec::new();
        let mut new_jobs = Vec::new();
        let mut stop_list = Vec::new();
        let mut seen = std::collections::HashSet::new();

        for config in configs {
            seen.insert(config.id);
            match self.manager.get(config.id) {
                Some(existing) if *existing.config == config => {
                    outcome.current.push(config.id);
                    current.push(existing);
                }
                Some(existing) => {
                    outcome.changed.push(config.id);
                    stop_list.push(existing);
                    new_jobs.push(Job::new(config, self.process.clone(), self.clock.clone()));
                }
                None => {
                    outcome.new.push(config.id);
                    new_jobs.push(Job::new(config, self.process.clone(), self.clock.clone()));
                }
            }
        }

        for id in self.manager.ids() {
            if !seen.contains(&id) {
                outcome.old.push(id);
                if let Some(job) = self.manager.get(id) {
                    stop_list.push(job);
                }
            }
        }

        let mut stopping = JoinSet::new();
        for job in stop_list {
            stopping.spawn(async move { job.stop(wait).await });
        }
        while stopping.join_next().await.is_some() {}

        let at_launch: Vec<_> = new_jobs.iter().filter(|j| j.config.at_launch).map(|j| j.id).collect();
        let mut installed: Vec<Arc<Job<P, C>>> = current;
        installed.extend(new_jobs.into_iter().map(Arc::new));
        self.manager.replace_all(installed);

        let mut starting = JoinSet::new();
        for id in at_launch {
            if let Some(job) = self.manager.get(id) {
                starting.spawn(async move { job.start(wait).await });
            }
        }
        while starting.join_next().await.is_some() {}

        outcome
    }
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
