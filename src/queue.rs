//! Bounded task queue and the shared pool state.
//!
//! The queue is a fixed ring of task slots with a write cursor (`begin`)
//! and a read cursor (`end`). One slot is always kept vacant so a full ring
//! can be told apart from an empty one. Slots are claimed oldest-first; a
//! range task stays in its slot and shrinks with every claim until it is
//! exhausted, which is what lets many threads drain one submission as a
//! parallel-for.
//!
//! All pool bookkeeping (ring, cursors, running flag, idle counter) lives
//! behind a single mutex. Two condition variables provide wake selectivity:
//! `work_available` for parked workers, `idle_changed` for callers blocked
//! in the idle barrier.

use crate::task::{Task, TaskFn};
use std::sync::{Condvar, Mutex};
use thiserror::Error;

/// Default number of ring slots. One slot is always vacant, so the usable
/// depth is one less.
pub const DEFAULT_CAPACITY: usize = 256;

/// Returned by [`TaskQueue::try_enqueue`] when every usable slot is
/// occupied. Carries the cursor state for the fatal report.
#[derive(Debug, Clone, Error)]
#[error("task queue full (begin={begin}, end={end}, capacity={capacity})")]
pub struct QueueFull {
    pub begin: usize,
    pub end: usize,
    pub capacity: usize,
}

/// Fixed-capacity FIFO ring of pending tasks.
///
/// The `running` flag and idle-worker count are kept alongside the ring so
/// that one mutex acquisition covers every piece of shared pool state.
pub struct TaskQueue {
    slots: Box<[Option<Task>]>,
    begin: usize,
    end: usize,
    pub(crate) running: bool,
    pub(crate) idle_workers: usize,
}

impl TaskQueue {
    /// Creates an empty queue with `capacity` ring slots.
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity >= 2, "queue capacity must be at least 2");
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        TaskQueue {
            slots: slots.into_boxed_slice(),
            begin: 0,
            end: 0,
            running: true,
            idle_workers: 0,
        }
    }

    /// Total ring slots, including the always-vacant one.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        (self.begin + self.capacity() - self.end) % self.capacity()
    }

    /// True when no claimable work remains.
    pub fn is_empty(&self) -> bool {
        self.begin == self.end
    }

    /// True when one more enqueue would overflow.
    pub fn is_full(&self) -> bool {
        (self.begin + 1) % self.capacity() == self.end
    }

    /// Writes `task` at the `begin` cursor and advances it.
    ///
    /// Returns the number of units the task covers so the caller can size
    /// its worker wake-up. A full ring is an error, not backpressure.
    pub fn try_enqueue(&mut self, task: Task) -> Result<usize, QueueFull> {
        if self.is_full() {
            return Err(QueueFull {
                begin: self.begin,
                end: self.end,
                capacity: self.capacity(),
            });
        }
        let units = task.remaining();
        self.slots[self.begin] = Some(task);
        self.begin = (self.begin + 1) % self.capacity();
        Ok(units)
    }

    /// Claims one unit from the oldest pending task.
    ///
    /// A task with more than one unit left stays in its slot with `start`
    /// advanced; a task on its last unit is popped and its slot vacated.
    /// Returns `None` when the queue is empty.
    pub fn claim(&mut self) -> Option<(TaskFn, usize)> {
        if self.is_empty() {
            return None;
        }
        let task = self.slots[self.end].as_mut()?;
        let claimed = task.claim_unit();
        if task.remaining() == 0 {
            self.slots[self.end] = None;
            self.advance_end();
        }
        Some(claimed)
    }

    /// Claims one unit from the oldest pending task whose current `start`
    /// index is one of `ids`.
    ///
    /// Other pending tasks are left untouched, which lets a blocked caller
    /// pull forward exactly the unit it needs without draining unrelated
    /// work first. Returns `None` when no task matches.
    pub fn claim_matching(&mut self, ids: &[usize]) -> Option<(TaskFn, usize)> {
        let mut i = self.end;
        while i != self.begin {
            if let Some(task) = self.slots[i].as_mut() {
                if ids.contains(&task.start()) {
                    let claimed = task.claim_unit();
                    if task.remaining() == 0 {
                        self.slots[i] = None;
                        self.advance_end();
                    }
                    return Some(claimed);
                }
            }
            i = (i + 1) % self.capacity();
        }
        None
    }

    /// Sweeps the read cursor past slots vacated by targeted claims, so the
    /// slot at `end` is always live while the queue is non-empty.
    fn advance_end(&mut self) {
        while self.end != self.begin && self.slots[self.end].is_none() {
            self.end = (self.end + 1) % self.capacity();
        }
    }
}

/// State shared between the facade, the workers and assisting callers.
pub(crate) struct Shared {
    pub(crate) queue: Mutex<TaskQueue>,
    pub(crate) work_available: Condvar,
    pub(crate) idle_changed: Condvar,
    pub(crate) worker_count: usize,
}

impl Shared {
    pub(crate) fn new(capacity: usize, worker_count: usize) -> Self {
        Shared {
            queue: Mutex::new(TaskQueue::with_capacity(capacity)),
            work_available: Condvar::new(),
            idle_changed: Condvar::new(),
            worker_count,
        }
    }

    /// Enqueues `task` and wakes workers.
    ///
    /// Overflow is a configuration error: the cursor state is reported
    /// through the log and the process aborts. Callers must size the queue
    /// for their worst-case pending submissions.
    pub(crate) fn submit(&self, task: Task) {
        let mut queue = self.queue.lock().unwrap();
        match queue.try_enqueue(task) {
            Ok(units) => {
                if units > 1 {
                    self.work_available.notify_all();
                } else {
                    self.work_available.notify_one();
                }
            }
            Err(err) => {
                log::error!("fatal: {err}");
                std::process::abort();
            }
        }
    }

    /// True when no work is pending and every worker is parked, or the pool
    /// is shutting down.
    pub(crate) fn is_idle(&self) -> bool {
        let queue = self.queue.lock().unwrap();
        !queue.running || (queue.is_empty() && queue.idle_workers == self.worker_count)
    }

    /// Blocks until [`Shared::is_idle`] would hold.
    pub(crate) fn wait_idle(&self) {
        let mut queue = self.queue.lock().unwrap();
        while queue.running && !(queue.is_empty() && queue.idle_workers == self.worker_count) {
            queue = self.idle_changed.wait(queue).unwrap();
        }
    }

    /// Claims the oldest pending unit and executes it on the calling
    /// thread. Returns false if the queue was empty.
    pub(crate) fn assist_any(&self) -> bool {
        let claimed = {
            let mut queue = self.queue.lock().unwrap();
            let claimed = queue.claim();
            if claimed.is_some() && queue.is_empty() {
                // Workers may all be parked already; without this wake a
                // caller blocked in wait_idle would never observe the
                // queue emptying.
                self.idle_changed.notify_all();
            }
            claimed
        };
        match claimed {
            Some((run, index)) => {
                run(index);
                true
            }
            None => false,
        }
    }

    /// Claims the oldest pending unit whose current start index is in
    /// `ids` and executes it on the calling thread. Returns false if no
    /// task matches.
    pub(crate) fn assist_matching(&self, ids: &[usize]) -> bool {
        let claimed = {
            let mut queue = self.queue.lock().unwrap();
            let claimed = queue.claim_matching(ids);
            if claimed.is_some() && queue.is_empty() {
                self.idle_changed.notify_all();
            }
            claimed
        };
        match claimed {
            Some((run, index)) => {
                run(index);
                true
            }
            None => false,
        }
    }

    /// Flips `running` off and wakes everything so parked workers re-check
    /// the flag and barrier waiters release.
    pub(crate) fn shutdown(&self) {
        let mut queue = self.queue.lock().unwrap();
        queue.running = false;
        self.work_available.notify_all();
        self.idle_changed.notify_all();
    }
}
