//! Error types for the server engine.
//!
//! The taxonomy follows the engine's failure domains:
//! - [`ConfigError`] — invalid sizes rejected at construction,
//! - [`PoolError`] — worker pool construction failures,
//! - [`SubmitError`] — saturation rejection on task submission,
//! - [`ServerError`] — startup and run-loop failures.
//!
//! Transient per-connection I/O errors never surface here; they are
//! logged and resolved by tearing the affected connection down.

use std::fmt;
use std::io;
use std::sync::Arc;

/// Invalid configuration rejected by the server builder.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The worker thread count must be at least 1.
    #[error("worker_threads must be > 0")]
    ZeroWorkerThreads,

    /// The task queue capacity must be at least 1.
    #[error("queue_capacity must be > 0")]
    ZeroQueueCapacity,

    /// The connection table capacity must be at least 1.
    #[error("max_connections must be > 0")]
    ZeroMaxConnections,

    /// The event batch size must be at least 1.
    #[error("max_events must be > 0")]
    ZeroMaxEvents,

    /// The housekeeping interval must be at least one second.
    ///
    /// The cadence is driven by `alarm(2)`, which has whole-second
    /// resolution.
    #[error("tick_interval must be >= 1 second")]
    TickIntervalTooShort,

    /// No service was installed on the builder.
    #[error("a service is required")]
    MissingService,
}

/// Worker pool construction failure.
#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    /// The thread count must be at least 1.
    #[error("thread count must be > 0")]
    ZeroThreads,

    /// The queue capacity must be at least 1.
    #[error("queue capacity must be > 0")]
    ZeroCapacity,

    /// A worker thread could not be spawned.
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] io::Error),
}

/// Rejection returned by [`WorkerPool::submit`](crate::pool::WorkerPool::submit).
///
/// The rejected task is handed back so the caller can decide what to do
/// with it. For connection tasks the contract is strict: a rejected
/// connection must be torn down immediately, or its descriptor stays
/// registered but is never serviced.
#[derive(thiserror::Error)]
pub enum SubmitError<T> {
    /// The queue is at capacity. Carries the rejected task.
    #[error("task queue full: capacity {capacity}")]
    QueueFull {
        /// Maximum capacity of the queue.
        capacity: usize,
        /// The task that was not enqueued.
        task: Arc<T>,
    },

    /// The pool is shutting down and no longer accepts work.
    #[error("pool shut down")]
    ShutDown {
        /// The task that was not enqueued.
        task: Arc<T>,
    },
}

impl<T> fmt::Debug for SubmitError<T> {
    /// Formats the rejection without requiring `T: Debug`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitError::QueueFull { capacity, .. } => f
                .debug_struct("QueueFull")
                .field("capacity", capacity)
                .finish_non_exhaustive(),
            SubmitError::ShutDown { .. } => f.debug_struct("ShutDown").finish_non_exhaustive(),
        }
    }
}

/// Fatal startup or shutdown failure of the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The builder was given invalid sizes.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// The worker pool could not be constructed.
    #[error("worker pool: {0}")]
    Pool(#[from] PoolError),

    /// A socket, epoll, or signal syscall failed during startup.
    #[error(transparent)]
    Io(#[from] io::Error),
}
