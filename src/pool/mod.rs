//! Bounded worker thread pool.
//!
//! This module contains the components that execute per-connection
//! protocol work off the reactor thread:
//! - [`core`]: the pool itself, its bounded queue, and its lifecycle,
//! - [`worker`]: the loop each worker thread runs.
//!
//! The pool decouples "data became readable" from "protocol processing":
//! the reactor submits a ready connection and immediately returns to the
//! multiplexer, so a slow request cannot stall event dispatch.

mod core;
mod worker;

pub use self::core::{Task, WorkerPool};
