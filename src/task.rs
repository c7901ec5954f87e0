//! Task definitions.
//!
//! Tasks are units of queued work covering a half-open index range. A range
//! task is not consumed in one call: workers (and assisting callers) claim
//! it one index at a time, so the callback is shared and invoked once per
//! claimed index.

use std::ops::Range;
use std::sync::Arc;

/// Callback invoked once per claimed index.
///
/// Shared because several threads may be executing different indices of the
/// same task concurrently.
pub type TaskFn = Arc<dyn Fn(usize) + Send + Sync + 'static>;

/// A unit of queued work covering the index range `[start, end)`.
///
/// The range shrinks monotonically as units are claimed; `start` only ever
/// increases, and the task is finished once `start == end`.
pub struct Task {
    run: TaskFn,
    start: usize,
    end: usize,
}

impl Task {
    /// Creates a task over `range`, invoking `run` once per index.
    pub fn new<F>(range: Range<usize>, run: F) -> Self
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        debug_assert!(range.start < range.end, "task range must be non-empty");
        Task {
            run: Arc::new(run),
            start: range.start,
            end: range.end,
        }
    }

    /// Creates a task covering the single index `[index, index + 1)`.
    pub fn single<F>(index: usize, run: F) -> Self
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        Self::new(index..index + 1, run)
    }

    /// The next index that a claim on this task would execute.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Number of indices not yet claimed.
    pub fn remaining(&self) -> usize {
        self.end - self.start
    }

    /// Claims one unit: shrinks the range and hands back the callback with
    /// the index to run.
    ///
    /// The claimed index is captured before `start` is advanced; executing
    /// from the shared field after the increment would skip the first unit
    /// of every range.
    pub(crate) fn claim_unit(&mut self) -> (TaskFn, usize) {
        let index = self.start;
        self.start += 1;
        (self.run.clone(), index)
    }
}
