//! Server construction and lifecycle.
//!
//! This module ties the engine together:
//! - [`builder`]: validated configuration and component wiring,
//! - [`core`]: the running server and its stop handle.
//!
//! A server owns one reactor thread's worth of state (the caller's
//! thread) and a fixed pool of worker threads. Stopping is cooperative:
//! `SIGTERM`, or a [`Notifier`](crate::Notifier) request, sets a flag
//! the reactor observes between event batches.

mod builder;
mod core;

pub use self::builder::ServerBuilder;
pub use self::core::Server;
