// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A named group of identical instances sharing one config: the "pool".
//! Fan-out only — all policy lives on [`Instance`](crate::instance::Instance).

use std::sync::Arc;

use tm_core::JobConfig;
use tm_process::ProcessAdapter;
use tokio::task::JoinSet;

use crate::instance::Instance;

/// A job's instance pool. Exposes only fan-out `start`/`stop` and identity;
/// `instances`/`at_launch` are read off `config` rather than duplicated.
pub struct Job<P: ProcessAdapter, C: tm_core::Clock> {
    pub id: u32,
    pub config: Arc<JobConfig>,
    pub instances: Vec<Arc<Instance<P, C>>>,
}

impl<P: ProcessAdapter, C: tm_core::Clock> Job<P, C> {
    /// Build a pool of `config.instances` fresh instances, none started.
    pub fn new(config: JobConfig, process: P, clock: C) -> Self
    where
        C: Clone,
    {
        let config = Arc::new(config);
        let instances = (0..config.instances)
            .map(|index| Instance::new(config.id, index, Arc::clone(&config), process.clone(), clock.clone()))
            .collect();
        Self {
            id: config.id,
            config,
            instances,
        }
    }

    /// Start every instance in the pool. When `wait` is true, returns only
    /// once every instance has resolved its first launch attempt (running,
    /// exited, or start_failed).
    pub async fn start(&self, wait: bool) {
        let mut latches = Vec::with_capacity(self.instances.len());
        for instance in &self.instances {
            latches.push(instance.start(false).await);
        }

        if wait {
            for latch in latches {
                latch.wait().await;
            }
        }
    }

    /// Stop every instance in the pool. When `wait` is true, returns only
    /// once every instance has left the active status set.
    pub async fn stop(&self, wait: bool) {
        let mut set = JoinSet::new();
        for instance in self.instances.iter().cloned() {
            set.spawn(async move { instance.stop(wait).await });
        }
        while set.join_next().await.is_some() {}
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
