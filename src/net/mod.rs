//! TCP networking primitives.
//!
//! This module provides the socket layer of the engine:
//! - [`listener`]: the non-blocking listening socket,
//! - [`conn`]: accepted connections with buffered non-blocking I/O.
//!
//! Connections are driven by the reactor (reads and writes on
//! readiness) and by worker threads (protocol processing); the one-shot
//! registration discipline guarantees the two never touch the same
//! connection at the same time.

pub(crate) mod conn;
pub(crate) mod listener;

pub(crate) use conn::{Connection, WriteOutcome};
pub(crate) use listener::Listener;
