//! Idle-connection timeout engine.
//!
//! This module implements the [`ExpiryList`], an ascending-ordered list
//! of per-connection deadlines. The reactor is responsible for:
//! - creating a timer when a connection is accepted,
//! - pushing the deadline out when the connection shows fresh activity,
//! - removing the timer when the connection closes for any other reason,
//! - sweeping the list on the housekeeping cadence to reap stale
//!   connections.
//!
//! Only the reactor thread touches the expiry list; worker threads
//! never do.

mod list;

pub use list::{ExpiryList, TimerId};
