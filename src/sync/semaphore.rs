use std::sync::{Condvar, Mutex};

/// A blocking counting semaphore.
///
/// `Semaphore` tracks a number of available permits. Threads acquire a
/// permit before consuming a unit of work and post a permit after
/// producing one. A thread that finds no permit available is suspended
/// on a condition variable and consumes no CPU until woken.
///
/// This is the signaling half of the worker pool's queue: the queue's
/// mutex guards membership, the semaphore guards availability.
pub struct Semaphore {
    /// Number of available permits.
    permits: Mutex<usize>,

    /// Wakes threads blocked in [`acquire`](Self::acquire).
    condvar: Condvar,
}

impl Semaphore {
    /// Creates a new semaphore with the given number of permits.
    pub fn new(permits: usize) -> Self {
        Self {
            permits: Mutex::new(permits),
            condvar: Condvar::new(),
        }
    }

    /// Acquires one permit, blocking until one is available.
    ///
    /// The calling thread sleeps on the internal condition variable
    /// while the permit count is zero. Spurious wakeups are handled by
    /// re-checking the count before returning.
    pub fn acquire(&self) {
        let mut permits = self.permits.lock().unwrap();

        while *permits == 0 {
            permits = self.condvar.wait(permits).unwrap();
        }

        *permits -= 1;
    }

    /// Adds one permit and wakes one blocked thread, if any.
    pub fn post(&self) {
        let mut permits = self.permits.lock().unwrap();
        *permits += 1;

        self.condvar.notify_one();
    }
}
