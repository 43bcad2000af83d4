//! Batched job execution on a rayon thread pool.
//!
//! Every arena-level operation of `EnvSet` is a batch: one job per arena
//! index. A batch either blocks until every job finished
//! (`for_each_mut`, `map_collect`) or is handed to the pool as a whole and
//! joined later (`spawn` + `PendingJob::join`).

use crate::{ArenaSetError, Result};
use crossbeam_channel::{bounded, Receiver};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// Fixed-size worker pool shared by every batch of one `EnvSet`.
#[derive(Clone)]
pub struct JobScheduler {
    pool: Arc<ThreadPool>,
}

impl JobScheduler {
    /// Build a pool with `num_threads` workers, or rayon's default count.
    pub fn new(num_threads: Option<usize>) -> Result<Self> {
        let mut builder = ThreadPoolBuilder::new().thread_name(|i| format!("arenaset-worker-{}", i));
        if let Some(n) = num_threads {
            if n == 0 {
                return Err(ArenaSetError::InvalidConfig(
                    "num_threads must be > 0".to_string(),
                ));
            }
            builder = builder.num_threads(n);
        }
        let pool = builder
            .build()
            .map_err(|e| ArenaSetError::InvalidConfig(format!("thread pool: {}", e)))?;
        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    pub fn num_threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Run `f(index, item)` for every item and wait for all of them.
    ///
    /// The first error aborts the batch; items not yet started are skipped.
    /// A panicking job is reported as `JobPanicked`.
    pub fn for_each_mut<T, F>(&self, items: &mut [T], f: F) -> Result<()>
    where
        T: Send,
        F: Fn(usize, &mut T) -> Result<()> + Send + Sync,
    {
        let run = || {
            self.pool.install(|| {
                items
                    .par_iter_mut()
                    .enumerate()
                    .try_for_each(|(i, item)| f(i, item))
            })
        };
        panic::catch_unwind(AssertUnwindSafe(run)).unwrap_or_else(|p| Err(panicked(p)))
    }

    /// Evaluate `f(index)` for every index in `[0, n)` in parallel and
    /// return the results in index order.
    pub fn map_collect<R, F>(&self, n: usize, f: F) -> Result<Vec<R>>
    where
        R: Send,
        F: Fn(usize) -> Result<R> + Send + Sync,
    {
        let run = || {
            self.pool
                .install(|| (0..n).into_par_iter().map(&f).collect::<Result<Vec<R>>>())
        };
        panic::catch_unwind(AssertUnwindSafe(run)).unwrap_or_else(|p| Err(panicked(p)))
    }

    /// Hand `job` to the pool and return immediately.
    pub fn spawn<T, F>(&self, job: F) -> PendingJob<T>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        let (tx, rx) = bounded(1);
        self.pool.spawn(move || {
            let result = panic::catch_unwind(AssertUnwindSafe(job)).map_err(panic_message);
            // The receiver may already be gone if the EnvSet was dropped
            let _ = tx.send(result);
        });
        PendingJob { rx }
    }
}

impl std::fmt::Debug for JobScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobScheduler")
            .field("num_threads", &self.num_threads())
            .finish()
    }
}

/// Result of a spawned job, available after `join`.
pub struct PendingJob<T> {
    rx: Receiver<std::result::Result<T, String>>,
}

impl<T> PendingJob<T> {
    /// Whether the job has already finished.
    pub fn is_finished(&self) -> bool {
        !self.rx.is_empty()
    }

    /// Block until the job finished.
    pub fn join(self) -> Result<T> {
        match self.rx.recv() {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(msg)) => Err(ArenaSetError::JobPanicked(msg)),
            Err(_) => Err(ArenaSetError::JobPanicked(
                "job was dropped before completing".to_string(),
            )),
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

fn panicked(payload: Box<dyn Any + Send>) -> ArenaSetError {
    ArenaSetError::JobPanicked(panic_message(payload))
}
