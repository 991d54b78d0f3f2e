// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Thread-safe job registry: job-id → [`Job`]. A pure index; it carries no
//! restart or reconcile policy of its own.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tm_core::Clock;
use tm_process::ProcessAdapter;

use crate::job::Job;

/// `map[id → Job]` guarded by one mutex. Jobs are held by `Arc` so `get`
/// hands callers a shared handle to the same in-memory pool rather than a
/// copy — exactly what reconcile's "current jobs are retained" case needs.
pub struct Manager<P: ProcessAdapter, C: Clock> {
    jobs: Mutex<HashMap<u32, Arc<Job<P, C>>>>,
}

impl<P: ProcessAdapter, C: Clock> Default for Manager<P, C> {
    fn default() -> Self {
        Self {
            jobs: Mutex::new(HashMap::new()),
        }
    }
}

impl<P: ProcessAdapter, C: Clock> Manager<P, C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `job`, overwriting any prior entry with the same id.
    pub fn add(&self, job: Job<P, C>) {
        self.jobs.lock().insert(job.id, Arc::new(job));
    }

    /// Insert every job in `jobs`, each overwriting any prior entry with the
    /// same id.
    pub fn add_many(&self, jobs: impl IntoIterator<Item = Job<P, C>>) {
        let mut guard = self.jobs.lock();
        for job in jobs {
            guard.insert(job.id, Arc::new(job));
        }
    }

    /// Remove and return the job with `id`, if present.
    pub fn remove(&self, id: u32) -> Option<Arc<Job<P, C>>> {
        self.jobs.lock().remove(&id)
    }

    /// Fetch the job registered under `id`, if any.
    pub fn get(&self, id: u32) -> Option<Arc<Job<P, C>>> {
        self.jobs.lock().get(&id).cloned()
    }

    pub fn has(&self, id: u32) -> bool {
        self.jobs.lock().contains_key(&id)
    }

    /// Call `f` with every registered job, in unspecified order, under the
    /// registry's lock.
    pub fn for_each(&self, mut f: impl FnMut(&Job<P, C>)) {
        for job in self.jobs.lock().values() {
            f(job);
        }
    }

    /// Atomically replace the entire contents of the registry with `jobs`.
    pub fn replace_all(&self, jobs: impl IntoIterator<Item = Arc<Job<P, C>>>) {
        let mut guard = self.jobs.lock();
        guard.clear();
        for job in jobs {
            guard.insert(job.id, job);
        }
    }

    pub fn ids(&self) -> Vec<u32> {
        self.jobs.lock().keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.jobs.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.lock().is_empty()
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
