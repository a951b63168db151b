use crate::pool::core::{PoolShared, Task};

use std::sync::Arc;
use std::sync::atomic::Ordering;

use tracing::debug;

/// A worker thread in the pool.
///
/// Each worker repeatedly:
/// 1. blocks on the semaphore until a task is available,
/// 2. re-checks the stop flag,
/// 3. pops the front task under the queue lock,
/// 4. runs the task with no lock held.
pub(crate) struct Worker<T> {
    /// Worker identifier, used only for logging.
    id: usize,

    /// State shared with the pool handle.
    shared: Arc<PoolShared<T>>,
}

impl<T: Task> Worker<T> {
    /// Creates a new worker.
    pub(crate) fn new(id: usize, shared: Arc<PoolShared<T>>) -> Self {
        Self { id, shared }
    }

    /// Runs the worker loop until shutdown.
    ///
    /// The stop check sits after the semaphore wait: shutdown posts one
    /// permit per worker, so a blocked worker wakes, observes the flag,
    /// and exits. A wakeup that finds the queue empty is not an error;
    /// the worker simply waits again.
    pub(crate) fn run(&self) {
        debug!(worker = self.id, "worker started");

        loop {
            self.shared.available.acquire();

            if self.shared.stop.load(Ordering::Acquire) {
                break;
            }

            let task = self.shared.queue.lock().unwrap().pop_front();

            match task {
                Some(task) => task.run(),
                None => continue,
            }
        }

        debug!(worker = self.id, "worker stopped");
    }
}
