//! I/O poller and raw syscall wrappers.
//!
//! This module provides the readiness multiplexer used by the reactor:
//! - wait for I/O readiness events in bounded batches,
//! - register descriptors with level or one-shot interest,
//! - expose thin `sys_*` wrappers over the libc calls the engine needs.
//!
//! The engine is built on Linux facilities (`epoll`, `SIGALRM`,
//! `socketpair`), so only the epoll backend exists.

pub(crate) mod common;

mod epoll;

pub(crate) use common::Interest;
pub(crate) use epoll::{Poller, Registry};

pub(crate) mod unix;

pub(crate) use unix as platform;
