//! # Vigilis
//!
//! **Vigilis** is a readiness-driven TCP server engine for Rust,
//! designed as the connection-handling layer for the **Nebula**
//! ecosystem.
//!
//! Unlike general-purpose frameworks, Vigilis focuses on the
//! concurrency and lifecycle engine only: a single-threaded epoll
//! reactor accepts and multiplexes connections, an expiry list reaps
//! idle peers on a signal-driven cadence, and a bounded worker pool
//! runs the application protocol off the reactor thread. The protocol
//! itself plugs in behind the [`Service`] trait.
//!
//! The engine is built around a few deliberate choices:
//!
//! - **One-shot registration** — a connection's descriptor is armed for
//!   exactly one event at a time, so the reactor and a single worker
//!   can never process the same connection concurrently
//! - **Signals as data** — `SIGALRM` and `SIGTERM` are forwarded
//!   through a self-pipe and handled on the reactor thread, never in
//!   signal-handler context
//! - **Deferred housekeeping** — the idle sweep runs after the event
//!   batch drains; I/O dispatch has priority
//! - **Bounded everything** — connection table, task queue, and event
//!   batch all have fixed capacities, and exhaustion is a rejection,
//!   never a crash
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use vigilis::{Outcome, ServerBuilder, Service};
//!
//! struct Echo;
//!
//! impl Service for Echo {
//!     fn respond(&self, request: &[u8]) -> Outcome {
//!         match request.iter().position(|&b| b == b'\n') {
//!             Some(end) => Outcome::Response {
//!                 body: request[..=end].to_vec(),
//!                 keep_alive: true,
//!             },
//!             None => Outcome::Incomplete,
//!         }
//!     }
//! }
//!
//! let server = ServerBuilder::new(8080).service(Echo).build()?;
//! server.run()?;
//! ```
//!
//! ## Modules
//!
//! - [`error`] — the engine's error taxonomy
//! - [`pool`] — the bounded worker pool
//! - [`service`] — the protocol seam
//! - [`sync`] — blocking synchronization primitives
//! - [`timer`] — the idle-connection expiry list

mod net;
mod reactor;
mod server;
mod signal;
mod utils;

pub mod error;
pub mod pool;
pub mod service;
pub mod sync;
pub mod timer;

pub use server::{Server, ServerBuilder};
pub use service::{Outcome, Service};
pub use signal::Notifier;
