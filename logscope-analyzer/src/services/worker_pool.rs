//! Bounded worker pool for row analysis
//!
//! One pool is created at startup and shared by every analysis run, so the
//! capacity bounds concurrent outbound calls process-wide.

use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

#[derive(Clone)]
pub struct WorkerPool {
    permits: Arc<Semaphore>,
    capacity: usize,
}

impl WorkerPool {
    /// Pool running at most `capacity` tasks at once (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            permits: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Permits not currently held by a running task
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    /// Queue `task`; it starts once a permit is free and holds it until done
    pub fn spawn<F>(&self, task: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let permits = Arc::clone(&self.permits);
        tokio::spawn(async move {
            let _permit = match permits.acquire_owned().await {
                Ok(permit) => Some(permit),
                Err(e) => {
                    tracing::warn!(error = %e, "Worker pool closed, running task without a permit");
                    None
                }
            };
            task.await
        })
    }
}
