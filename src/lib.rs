//! # forkpool - Bounded fork-join task pool
//!
//! A fixed-capacity task queue paired with a fixed pool of worker threads.
//! Work is submitted as index ranges; workers cooperatively drain a range
//! one index at a time, so a single `submit` of `[0, n)` behaves like a
//! parallel-for across the pool. Any caller thread can additionally "assist"
//! by claiming and executing pending units itself.
//!
//! ## Architecture
//!
//! The queue is a bounded ring of [`Task`] slots protected by one mutex and
//! two condition variables. Key components include:
//!
//! - **Tasks**: A shared per-index callback plus a half-open `[start, end)`
//!   index range that shrinks as units are claimed
//! - **Task Queue**: Fixed-capacity FIFO ring; overflow is a fatal
//!   configuration error, not backpressure
//! - **Worker Pool**: OS threads that park on the queue and execute claimed
//!   units unlocked
//! - **Idle Barrier**: [`TaskPool::wait_idle`] blocks until every submitted
//!   unit has been executed and all workers are parked again
//!
//! ## Example
//!
//! ```no_run
//! use forkpool::TaskPool;
//!
//! let pool = TaskPool::new(4); // 4 worker threads
//!
//! pool.submit(1024, |index| {
//!     println!("processing element {index}");
//! });
//!
//! pool.wait_idle();
//! pool.shutdown().unwrap();
//! ```

pub mod pool;
pub mod queue;
pub mod task;
pub mod worker;

pub use pool::{PoolConfig, PoolError, TaskPool};
pub use queue::{QueueFull, TaskQueue};
pub use task::{Task, TaskFn};
