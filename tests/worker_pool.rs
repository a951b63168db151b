use vigilis::error::{PoolError, SubmitError};
use vigilis::pool::{Task, WorkerPool};

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread;
use std::time::{Duration, Instant};

/// Test task: records its id, optionally holding until released.
struct Job {
    id: usize,
    log: Arc<Mutex<Vec<usize>>>,
    gate: Option<Arc<(Mutex<bool>, Condvar)>>,
}

impl Job {
    fn new(id: usize, log: Arc<Mutex<Vec<usize>>>) -> Arc<Self> {
        Arc::new(Self {
            id,
            log,
            gate: None,
        })
    }

    fn gated(id: usize, log: Arc<Mutex<Vec<usize>>>, gate: Arc<(Mutex<bool>, Condvar)>) -> Arc<Self> {
        Arc::new(Self {
            id,
            log,
            gate: Some(gate),
        })
    }
}

impl Task for Job {
    fn run(&self) {
        if let Some(gate) = &self.gate {
            let (lock, condvar) = &**gate;
            let mut open = lock.lock().unwrap();
            while !*open {
                open = condvar.wait(open).unwrap();
            }
        }

        self.log.lock().unwrap().push(self.id);
    }
}

fn open_gate(gate: &Arc<(Mutex<bool>, Condvar)>) {
    let (lock, condvar) = &**gate;
    *lock.lock().unwrap() = true;
    condvar.notify_all();
}

fn wait_for<F: Fn() -> bool>(cond: F, what: &str) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !cond() {
        assert!(Instant::now() < deadline, "timed out waiting for {what}");
        thread::sleep(Duration::from_millis(5));
    }
}

#[test]
fn construction_rejects_zero_sizes() {
    assert!(matches!(
        WorkerPool::<Job>::new(0, 10),
        Err(PoolError::ZeroThreads)
    ));
    assert!(matches!(
        WorkerPool::<Job>::new(4, 0),
        Err(PoolError::ZeroCapacity)
    ));
}

#[test]
fn single_worker_preserves_fifo_order() {
    let pool = WorkerPool::new(1, 100).expect("Failed to build pool");
    let log = Arc::new(Mutex::new(Vec::new()));

    for id in 0..50 {
        pool.submit(Job::new(id, log.clone())).expect("submit failed");
    }

    wait_for(|| log.lock().unwrap().len() == 50, "all tasks to run");
    pool.shutdown();

    let order = log.lock().unwrap();
    assert_eq!(*order, (0..50).collect::<Vec<_>>());
}

#[test]
fn every_task_runs_exactly_once_under_concurrent_submission() {
    let pool = Arc::new(WorkerPool::new(4, 10_000).expect("Failed to build pool"));
    let log = Arc::new(Mutex::new(Vec::new()));

    let submitters: Vec<_> = (0..4)
        .map(|lane| {
            let pool = pool.clone();
            let log = log.clone();
            thread::spawn(move || {
                for i in 0..100 {
                    let id = lane * 100 + i;
                    pool.submit(Job::new(id, log.clone())).expect("submit failed");
                }
            })
        })
        .collect();

    for handle in submitters {
        handle.join().expect("Submitter panicked");
    }

    wait_for(|| log.lock().unwrap().len() == 400, "all tasks to run");

    let mut seen = log.lock().unwrap().clone();
    seen.sort_unstable();
    seen.dedup();
    assert_eq!(seen.len(), 400, "tasks lost or duplicated");
}

#[test]
fn submit_on_full_queue_rejects_without_blocking() {
    let pool = WorkerPool::new(1, 1).expect("Failed to build pool");
    let log = Arc::new(Mutex::new(Vec::new()));
    let gate = Arc::new((Mutex::new(false), Condvar::new()));

    // Occupy the only worker so the queue state is deterministic.
    pool.submit(Job::gated(0, log.clone(), gate.clone()))
        .expect("submit failed");
    wait_for(|| pool.queued() == 0, "worker to take the blocker");

    // Fill the queue to capacity.
    pool.submit(Job::new(1, log.clone())).expect("submit failed");
    assert_eq!(pool.queued(), 1);

    // The next submission must be rejected immediately, queue intact.
    let started = Instant::now();
    let rejected = pool.submit(Job::new(2, log.clone()));
    assert!(started.elapsed() < Duration::from_millis(100));
    assert!(matches!(
        rejected,
        Err(SubmitError::QueueFull { capacity: 1, .. })
    ));
    assert_eq!(pool.queued(), 1);

    open_gate(&gate);
    wait_for(|| log.lock().unwrap().len() == 2, "accepted tasks to run");

    pool.shutdown();

    let order = log.lock().unwrap();
    assert_eq!(*order, vec![0, 1], "rejected task must not run");
}

#[test]
fn shutdown_wakes_idle_workers() {
    let pool: WorkerPool<Job> = WorkerPool::new(8, 100).expect("Failed to build pool");

    // All eight workers are blocked on the semaphore with no work.
    // Shutdown must wake and join every one of them.
    let done = Arc::new(AtomicUsize::new(0));
    let done_clone = done.clone();

    let handle = thread::spawn(move || {
        pool.shutdown();
        done_clone.store(1, Ordering::SeqCst);
    });

    wait_for(|| done.load(Ordering::SeqCst) == 1, "shutdown to complete");
    handle.join().expect("Shutdown panicked");
}

#[test]
fn drop_joins_workers() {
    let log = Arc::new(Mutex::new(Vec::new()));

    {
        let pool = WorkerPool::new(2, 10).expect("Failed to build pool");
        pool.submit(Job::new(7, log.clone())).expect("submit failed");
        wait_for(|| log.lock().unwrap().len() == 1, "task to run");
        // Dropped here without an explicit shutdown.
    }

    assert_eq!(*log.lock().unwrap(), vec![7]);
}
