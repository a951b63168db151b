//! Synchronization primitives for the worker pool.
//!
//! This module provides the blocking primitives the engine uses to hand
//! work from the reactor thread to the worker threads without
//! busy-waiting.
//!
//! The current primitives include:
//! - [`Semaphore`] — a counting semaphore for availability signaling.
//!
//! The work queue itself is guarded by a plain `std::sync::Mutex`; the
//! semaphore only tracks how many tasks are available so that idle
//! workers can sleep until one arrives.

mod semaphore;

pub use semaphore::Semaphore;
