// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A one-shot, idempotent completion signal, used to report "this instance
//! has finished starting (or failed to)" back to a caller that may or may
//! not still be waiting.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

#[derive(Clone, Default)]
pub struct Latch {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    resolved: AtomicBool,
    notify: Notify,
}

impl Latch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the latch resolved. Safe to call more than once or from more
    /// than one task; only the first call wakes waiters.
    pub fn resolve(&self) {
        if self
            .inner
            .resolved
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            self.inner.notify.notify_waiters();
        }
    }

    /// Wait until [`resolve`](Self::resolve) has been called.
    ///
    /// Resolves immediately if the latch was already resolved before this
    /// call, even if that happened before any waiter existed.
    pub async fn wait(&self) {
        if self.is_resolved() {
            return;
        }
        let notified = self.inner.notify.notified();
        if self.is_resolved() {
            return;
        }
        notified.await;
    }

    pub fn is_resolved(&self) -> bool {
        self.inner.resolved.load(Ordering::Acquire)
    }
}

#[cfg(test)]
#[path = "latch_tests.rs"]
mod tests;
