// src/queue.rs

//! Permit-bounded work submission.
//!
//! Tracked sources never run their checksum scans directly; they hand the
//! work to a [`TaskQueue`] so a session can bound how much scanning happens
//! at once. The contract is deliberately minimal: submit a unit of work,
//! get a future for its output.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;

#[derive(Debug, Clone)]
pub struct TaskQueue {
    permits: Arc<Semaphore>,
}

impl TaskQueue {
    pub fn new(width: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(width.max(1))),
        }
    }

    /// Run `work` once a permit is available, holding the permit for the
    /// duration of the work.
    pub async fn run<F>(&self, work: F) -> F::Output
    where
        F: Future,
    {
        let _permit = self
            .permits
            .acquire()
            .await
            .expect("task queue semaphore is never closed");
        work.await
    }
}
