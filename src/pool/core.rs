use crate::error::{PoolError, SubmitError};
use crate::pool::worker::Worker;
use crate::sync::Semaphore;

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

/// A unit of protocol work executed by a worker thread.
///
/// The pool is generic over the task type so the engine core does not
/// depend on any particular protocol. The server submits connections;
/// tests submit whatever they need to observe.
pub trait Task: Send + Sync + 'static {
    /// Runs the task to completion.
    ///
    /// Called by exactly one worker thread per submission, with no pool
    /// lock held.
    fn run(&self);
}

/// State shared between the pool handle and its worker threads.
pub(crate) struct PoolShared<T> {
    /// FIFO queue of pending tasks. The mutex guards membership only.
    pub(crate) queue: Mutex<VecDeque<Arc<T>>>,

    /// Maximum number of pending tasks.
    pub(crate) capacity: usize,

    /// Counts available tasks; workers sleep on it between tasks.
    pub(crate) available: Semaphore,

    /// Set once at shutdown. Workers re-check it after every wakeup.
    pub(crate) stop: AtomicBool,
}

/// A fixed-size pool of worker threads draining a bounded task queue.
///
/// Workers are long-lived: they are spawned at construction and joined
/// at shutdown. Between tasks a worker blocks on the semaphore and
/// consumes no CPU.
pub struct WorkerPool<T: Task> {
    /// State shared with the workers.
    shared: Arc<PoolShared<T>>,

    /// Join handles for the worker threads.
    handles: Vec<JoinHandle<()>>,
}

impl<T: Task> WorkerPool<T> {
    /// Creates a pool with `threads` workers and a queue bounded at
    /// `capacity` pending tasks.
    ///
    /// # Errors
    ///
    /// Returns an error if `threads` or `capacity` is zero.
    pub fn new(threads: usize, capacity: usize) -> Result<Self, PoolError> {
        if threads == 0 {
            return Err(PoolError::ZeroThreads);
        }
        if capacity == 0 {
            return Err(PoolError::ZeroCapacity);
        }

        let shared = Arc::new(PoolShared {
            queue: Mutex::new(VecDeque::new()),
            capacity,
            available: Semaphore::new(0),
            stop: AtomicBool::new(false),
        });

        let mut handles = Vec::with_capacity(threads);

        for id in 0..threads {
            let worker = Worker::new(id, shared.clone());

            let spawned = thread::Builder::new()
                .name(format!("worker-{id}"))
                .spawn(move || worker.run());

            match spawned {
                Ok(handle) => handles.push(handle),
                Err(err) => {
                    // Wind down the workers that did start.
                    drop(Self { shared, handles });
                    return Err(PoolError::Spawn(err));
                }
            }
        }

        Ok(Self { shared, handles })
    }

    /// Submits a task for execution.
    ///
    /// On success the task is appended to the queue and exactly one
    /// blocked worker (if any) is woken. A full queue is a rejection,
    /// not a wait: the task is handed back immediately, no worker is
    /// woken, and the queue is left untouched.
    ///
    /// # Errors
    ///
    /// [`SubmitError::QueueFull`] when the queue is at capacity,
    /// [`SubmitError::ShutDown`] after shutdown has begun.
    pub fn submit(&self, task: Arc<T>) -> Result<(), SubmitError<T>> {
        if self.shared.stop.load(Ordering::Acquire) {
            return Err(SubmitError::ShutDown { task });
        }

        {
            let mut queue = self.shared.queue.lock().unwrap();

            if queue.len() >= self.shared.capacity {
                return Err(SubmitError::QueueFull {
                    capacity: self.shared.capacity,
                    task,
                });
            }

            queue.push_back(task);
        }

        self.shared.available.post();

        Ok(())
    }

    /// Returns the number of tasks currently queued.
    pub fn queued(&self) -> usize {
        self.shared.queue.lock().unwrap().len()
    }

    /// Shuts the pool down and joins every worker.
    ///
    /// The stop flag is set first, then the semaphore is posted once
    /// per worker so that no worker stays blocked waiting for a task
    /// that will never arrive. Tasks still queued at this point are not
    /// executed.
    pub fn shutdown(mut self) {
        self.stop_and_join();
    }

    fn stop_and_join(&mut self) {
        if self.handles.is_empty() {
            return;
        }

        self.shared.stop.store(true, Ordering::Release);

        for _ in 0..self.handles.len() {
            self.shared.available.post();
        }

        for handle in self.handles.drain(..) {
            let _ = handle.join();
        }
    }
}

impl<T: Task> Drop for WorkerPool<T> {
    /// Shuts the pool down if [`shutdown`](Self::shutdown) was not
    /// called explicitly.
    fn drop(&mut self) {
        self.stop_and_join();
    }
}
