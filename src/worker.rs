//! Worker thread implementation.
//!
//! Workers park on the shared queue's "work available" condition, claim one
//! unit at a time under the queue mutex, and execute it unlocked. The claim
//! critical section is a few cursor updates, so concurrent claims from the
//! same range task fan its indices across the whole pool.

use crate::queue::Shared;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// A worker thread that executes claimed units from the shared queue.
pub struct Worker {
    id: usize,
    handle: Option<JoinHandle<()>>,
}

impl Worker {
    /// Creates and starts a new worker thread.
    ///
    /// The worker loops between parked-idle and executing until shutdown
    /// flips the queue's running flag, then drains any remaining work
    /// before exiting.
    pub(crate) fn new(id: usize, shared: Arc<Shared>, pin_to_core: bool) -> Self {
        let handle = thread::Builder::new()
            .name(format!("forkpool-worker-{id}"))
            .spawn(move || {
                // Pin worker to its core for better cache locality
                if pin_to_core {
                    if let Some(core_ids) = core_affinity::get_core_ids() {
                        if id < core_ids.len() {
                            core_affinity::set_for_current(core_ids[id]);
                        }
                    }
                }

                Worker::run_loop(&shared);
            })
            .expect("failed to spawn worker thread");

        Worker {
            id,
            handle: Some(handle),
        }
    }

    /// Main execution loop for the worker thread.
    fn run_loop(shared: &Shared) {
        loop {
            let mut queue = shared.queue.lock().unwrap();

            queue.idle_workers += 1;
            while queue.running && queue.is_empty() {
                shared.idle_changed.notify_all();
                queue = shared.work_available.wait(queue).unwrap();
            }
            queue.idle_workers -= 1;

            if queue.is_empty() {
                // Only reachable once shutdown cleared the running flag.
                // Count this thread as idle one final time so the barrier
                // releases.
                queue.idle_workers += 1;
                shared.idle_changed.notify_all();
                return;
            }

            let claimed = queue.claim();
            drop(queue);

            if let Some((run, index)) = claimed {
                run(index);
            }
        }
    }

    /// Returns the worker's ID.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Waits for the worker thread to finish.
    pub fn join(mut self) -> thread::Result<()> {
        if let Some(handle) = self.handle.take() {
            handle.join()
        } else {
            Ok(())
        }
    }
}

/// The fixed set of worker threads draining one shared queue.
pub struct WorkerPool {
    workers: Vec<Worker>,
}

impl WorkerPool {
    /// Spawns `num_threads` workers against `shared`.
    pub(crate) fn new(num_threads: usize, shared: &Arc<Shared>, pin_to_core: bool) -> Self {
        let workers = (0..num_threads)
            .map(|id| Worker::new(id, Arc::clone(shared), pin_to_core))
            .collect();
        WorkerPool { workers }
    }

    /// Returns the number of worker threads in the pool.
    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Joins every worker, tracking failures.
    ///
    /// Returns Ok if all workers shut down cleanly, or Err with the number
    /// of workers that panicked. Safe to call again after the first drain.
    pub(crate) fn join_all(&mut self) -> Result<(), usize> {
        let mut failed = 0;
        for worker in self.workers.drain(..) {
            let worker_id = worker.id();
            if worker.join().is_err() {
                failed += 1;
                log::error!("worker {worker_id} panicked during execution");
            }
        }

        if failed > 0 {
            Err(failed)
        } else {
            Ok(())
        }
    }
}
