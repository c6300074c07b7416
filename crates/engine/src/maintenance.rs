//! Detached background maintenance tasks.
//!
//! Trimming and background revalidation must not delay the response
//! already handed to the caller, but they still have to run to
//! completion and their failures must never escape into the host.
//! [`Maintenance`] spawns such tasks detached from the response path
//! and lets the host await a full drain at shutdown.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use haven_core::Error;
use tokio::sync::Notify;

/// Spawner for fire-and-forget maintenance work.
#[derive(Debug, Default)]
pub struct Maintenance {
    pending: AtomicUsize,
    idle: Notify,
}

impl Maintenance {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Spawn a detached task.
    ///
    /// The task's error, if any, is logged at warn and swallowed; the
    /// caller never observes it.
    pub fn spawn(self: &Arc<Self>, label: &'static str, task: impl Future<Output = Result<(), Error>> + Send + 'static) {
        self.pending.fetch_add(1, Ordering::AcqRel);
        let tracker = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(e) = task.await {
                tracing::warn!(task = label, error = %e, "maintenance task failed");
            }
            if tracker.pending.fetch_sub(1, Ordering::AcqRel) == 1 {
                tracker.idle.notify_waiters();
            }
        });
    }

    /// Number of maintenance tasks still running.
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }

    /// Wait until every spawned task has finished.
    ///
    /// Intended for graceful shutdown and for tests that need trim or
    /// revalidation effects to be visible.
    pub async fn drain(&self) {
        loop {
            let notified = self.idle.notified();
            if self.pending.load(Ordering::Acquire) == 0 {
                return;
            }
            notified.await;
        }
    }
}
