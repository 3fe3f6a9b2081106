//! Bounded worker pool: fan out a batch of async jobs with a fixed
//! concurrency limit.
//!
//! Every job is spawned into a [`JoinSet`] and must hold a semaphore permit
//! while it runs, so at most `width` jobs are in flight. `run` blocks until
//! every job has resolved. Each job returns its own result value; results
//! are only merged by the caller after the pool has drained.
//!
//! Dropping the `run` future aborts every job still queued or in flight, so
//! an abandoned pass stops calling external services.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, warn};

/// A named pool with a fixed concurrency width.
#[derive(Debug, Clone)]
pub struct WorkerPool {
    name: &'static str,
    width: usize,
    permits: Arc<Semaphore>,
}

impl WorkerPool {
    /// Create a pool. A width of zero is raised to one.
    pub fn new(name: &'static str, width: usize) -> Self {
        let width = width.max(1);
        Self {
            name,
            width,
            permits: Arc::new(Semaphore::new(width)),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Run `job` over every item and wait for all of them.
    ///
    /// Results come back in submission order. A job that panics is logged
    /// and contributes no result.
    pub async fn run<T, R, F, Fut>(&self, items: Vec<T>, job: F) -> Vec<R>
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
    {
        let job = Arc::new(job);
        let submitted = items.len();
        let mut set = JoinSet::new();

        for (index, item) in items.into_iter().enumerate() {
            let permits = self.permits.clone();
            let job = job.clone();
            set.spawn(async move {
                let _permit = permits.acquire_owned().await.ok()?;
                Some((index, job(item).await))
            });
        }

        let mut indexed = Vec::with_capacity(submitted);
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(Some(entry)) => indexed.push(entry),
                Ok(None) => warn!(pool = self.name, "worker pool closed before job ran"),
                Err(e) => error!(pool = self.name, error = %e, "worker job panicked"),
            }
        }
        indexed.sort_unstable_by_key(|(index, _)| *index);
        let results: Vec<R> = indexed.into_iter().map(|(_, result)| result).collect();

        debug!(
            pool = self.name,
            width = self.width,
            submitted,
            completed = results.len(),
            "worker pool drained"
        );
        results
    }
}
