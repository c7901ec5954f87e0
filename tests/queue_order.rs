//! FIFO ordering at slot granularity: with one worker, whole tasks run in
//! submission order.

use forkpool::TaskPool;
use std::sync::{Arc, Mutex};

#[test]
fn test_single_worker_runs_tasks_in_submission_order() {
    let pool = TaskPool::new(1);
    let order: Arc<Mutex<Vec<usize>>> = Arc::new(Mutex::new(Vec::new()));

    for n in 0..10 {
        let order_clone = Arc::clone(&order);
        pool.submit_one(n, move |index| {
            order_clone.lock().unwrap().push(index);
        });
    }
    pool.wait_idle();

    assert_eq!(*order.lock().unwrap(), (0..10).collect::<Vec<_>>());
    pool.shutdown().expect("shutdown failed");
}

#[test]
fn test_single_worker_drains_a_before_b() {
    let pool = TaskPool::new(1);
    let order: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));

    let order_a = Arc::clone(&order);
    pool.submit_one(0, move |_| {
        order_a.lock().unwrap().push("a");
    });
    let order_b = Arc::clone(&order);
    pool.submit_one(0, move |_| {
        order_b.lock().unwrap().push("b");
    });
    pool.wait_idle();

    assert_eq!(*order.lock().unwrap(), vec!["a", "b"]);
    pool.shutdown().expect("shutdown failed");
}

#[test]
fn test_single_worker_finishes_range_before_later_task() {
    // A range task occupies the head slot until exhausted, so its every
    // index runs before a task submitted after it.
    let pool = TaskPool::new(1);
    let order: Arc<Mutex<Vec<usize>>> = Arc::new(Mutex::new(Vec::new()));

    let order_range = Arc::clone(&order);
    pool.submit_range(0..5, move |index| {
        order_range.lock().unwrap().push(index);
    });
    let order_tail = Arc::clone(&order);
    pool.submit_one(99, move |index| {
        order_tail.lock().unwrap().push(index);
    });
    pool.wait_idle();

    assert_eq!(*order.lock().unwrap(), vec![0, 1, 2, 3, 4, 99]);
    pool.shutdown().expect("shutdown failed");
}
