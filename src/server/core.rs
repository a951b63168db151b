use crate::error::ServerError;
use crate::reactor::Reactor;
use crate::signal::Notifier;

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A fully constructed server, ready to run.
///
/// [`run`](Self::run) drives the reactor loop on the calling thread
/// until a stop request arrives (a `SIGTERM`, or
/// [`Notifier::request_stop`]). Grab the [`notifier`](Self::notifier)
/// before calling `run` if you need to stop the server from another
/// thread.
pub struct Server {
    /// The wired-up reactor.
    reactor: Reactor,

    /// Stop/sweep handle, shared with embedders.
    notifier: Notifier,

    /// The address the listener actually bound.
    local_addr: SocketAddr,

    /// Open-connection count, shared with the reactor.
    live: Arc<AtomicUsize>,
}

impl Server {
    pub(crate) fn new(
        reactor: Reactor,
        notifier: Notifier,
        local_addr: SocketAddr,
        live: Arc<AtomicUsize>,
    ) -> Self {
        Self {
            reactor,
            notifier,
            local_addr,
            live,
        }
    }

    /// Returns the address the listener is bound to.
    ///
    /// Useful with port `0`, where the kernel picks the port.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Returns a handle for stopping the server from another thread.
    pub fn notifier(&self) -> Notifier {
        self.notifier.clone()
    }

    /// Returns the number of currently open connections.
    pub fn connections(&self) -> usize {
        self.live.load(Ordering::Relaxed)
    }

    /// Runs the server until a stop request arrives.
    ///
    /// Blocks the calling thread in the reactor loop. On a clean stop
    /// every connection is torn down, the worker pool is joined, the
    /// signal dispositions are restored, and all descriptors are
    /// closed.
    pub fn run(self) -> Result<(), ServerError> {
        self.reactor.run()?;

        Ok(())
    }
}
