//! High-level task pool interface.
//!
//! [`TaskPool`] is the primary entry point: it owns the shared queue and the
//! worker threads, and exposes submission, the idle barrier and the assist
//! operations. Each pool is an independent handle; nothing is global, so
//! several pools can coexist and tests stay isolated.

use crate::queue::{Shared, DEFAULT_CAPACITY};
use crate::task::Task;
use crate::worker::WorkerPool;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::sync::Arc;
use std::thread;
use thiserror::Error;

/// Absolute upper bound on worker threads, applied on top of the core-count
/// cap and the caller's request.
pub const MAX_WORKERS: usize = 64;

/// Configuration for the task pool.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Ring slots in the task queue. One slot is always kept vacant, so at
    /// most `queue_capacity - 1` submissions can be pending at once.
    /// Default: 256.
    pub queue_capacity: usize,
    /// Pin each worker to a CPU core (worker i -> logical processor i).
    /// Default: false.
    pub pin_workers: bool,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_CAPACITY,
            pin_workers: false,
        }
    }
}

/// Errors reported when tearing a pool down.
#[derive(Debug, Error)]
pub enum PoolError {
    #[error("{0} worker thread(s) panicked")]
    WorkersPanicked(usize),
}

/// The main task pool managing worker threads and queued work.
///
/// Submitted ranges are drained cooperatively: each worker claims one index
/// at a time, so one large submission spreads across the whole pool. The
/// caller can join in via [`TaskPool::assist_any`] /
/// [`TaskPool::assist_matching`] instead of sleeping on the barrier.
pub struct TaskPool {
    shared: Arc<Shared>,
    workers: WorkerPool,
}

impl TaskPool {
    /// Creates a new task pool with the requested number of worker threads.
    ///
    /// The effective count is clamped to the number of CPU cores and to
    /// [`MAX_WORKERS`], with a minimum of one.
    ///
    /// # Example
    ///
    /// ```
    /// use forkpool::TaskPool;
    ///
    /// let pool = TaskPool::new(4);
    /// assert!(pool.worker_count() >= 1);
    /// ```
    pub fn new(num_threads: usize) -> Self {
        Self::with_config(num_threads, PoolConfig::default())
    }

    /// Creates a new task pool with custom configuration.
    pub fn with_config(num_threads: usize, config: PoolConfig) -> Self {
        let worker_count = clamp_workers(num_threads);
        let shared = Arc::new(Shared::new(config.queue_capacity, worker_count));
        let workers = WorkerPool::new(worker_count, &shared, config.pin_workers);
        log::debug!(
            "task pool started: {worker_count} workers, {} queue slots",
            config.queue_capacity
        );
        TaskPool { shared, workers }
    }

    /// Creates a task pool with one thread per CPU core.
    pub fn with_default_threads() -> Self {
        let num_cpus = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4);
        TaskPool::new(num_cpus)
    }

    /// Submits one task covering the indices `[0, count)`.
    ///
    /// Equivalent to `submit_range(0..count, task)`. A zero count is a
    /// no-op.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use forkpool::TaskPool;
    ///
    /// let pool = TaskPool::new(4);
    /// pool.submit(1500, |index| {
    ///     println!("element {index}");
    /// });
    /// pool.wait_idle();
    /// ```
    pub fn submit<F>(&self, count: usize, task: F)
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        self.submit_range(0..count, task)
    }

    /// Submits one task covering the half-open index range `range`.
    ///
    /// The task occupies a single queue slot regardless of how many indices
    /// it spans. An empty range is a no-op. Overflowing the queue is fatal:
    /// the cursor state is logged and the process aborts.
    pub fn submit_range<F>(&self, range: Range<usize>, task: F)
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        if range.is_empty() {
            return;
        }
        self.shared.submit(Task::new(range, task));
    }

    /// Submits a task covering the single index `[index, index + 1)`.
    pub fn submit_one<F>(&self, index: usize, task: F)
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        self.shared.submit(Task::single(index, task));
    }

    /// Returns the number of worker threads in the pool.
    pub fn worker_count(&self) -> usize {
        self.workers.size()
    }

    /// True when no work is pending and every worker is parked, or the
    /// pool is shutting down. Non-blocking.
    pub fn is_idle(&self) -> bool {
        self.shared.is_idle()
    }

    /// Blocks until every submitted unit has executed and all workers are
    /// parked again. The join point after a burst of submissions.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use forkpool::TaskPool;
    ///
    /// let pool = TaskPool::new(4);
    /// for asset in 0..8 {
    ///     pool.submit_one(asset, |index| {
    ///         println!("loading asset {index}");
    ///     });
    /// }
    /// pool.wait_idle();
    /// ```
    pub fn wait_idle(&self) {
        self.shared.wait_idle();
    }

    /// Claims the oldest pending unit and executes it on the calling
    /// thread.
    ///
    /// Returns false if the queue was empty. Lets a caller help drain the
    /// backlog instead of sleeping on the barrier.
    pub fn assist_any(&self) -> bool {
        self.shared.assist_any()
    }

    /// Claims and executes the oldest pending unit whose current start
    /// index is one of `ids`, on the calling thread.
    ///
    /// Returns false if no pending unit matches. Supports "help load what
    /// I'm blocked on" without first executing unrelated units.
    pub fn assist_matching(&self, ids: &[usize]) -> bool {
        self.shared.assist_matching(ids)
    }

    /// Shuts the pool down and joins every worker.
    ///
    /// Workers drain any still-queued work before exiting, so this returns
    /// even when called with a non-empty queue. Submissions must not race
    /// with teardown.
    pub fn shutdown(mut self) -> Result<(), PoolError> {
        log::debug!("task pool shutting down");
        self.shared.shutdown();
        self.workers.join_all().map_err(PoolError::WorkersPanicked)
    }
}

impl Drop for TaskPool {
    fn drop(&mut self) {
        self.shared.shutdown();
        let _ = self.workers.join_all();
    }
}

impl Default for TaskPool {
    fn default() -> Self {
        TaskPool::with_default_threads()
    }
}

fn clamp_workers(requested: usize) -> usize {
    let cores = thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4);
    requested.max(1).min(cores).min(MAX_WORKERS)
}
