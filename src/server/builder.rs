use super::core::Server;
use crate::error::{ConfigError, ServerError};
use crate::net::Listener;
use crate::pool::WorkerPool;
use crate::reactor::Reactor;
use crate::reactor::poller::Poller;
use crate::service::Service;
use crate::signal::SignalBridge;

use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use std::time::Duration;

/// Builder for configuring and creating a server.
///
/// `ServerBuilder` collects the engine's tunables and validates them at
/// [`build`](Self::build). Every limit has the conventional default for
/// servers of this shape; only the port and the service are required.
///
/// # Examples
///
/// ```rust,ignore
/// let server = ServerBuilder::new(8080)
///     .worker_threads(4)
///     .service(MyProtocol)
///     .build()?;
/// server.run()?;
/// ```
pub struct ServerBuilder {
    /// Port to listen on; `0` lets the kernel pick.
    port: u16,

    /// Number of worker threads in the pool.
    worker_threads: usize,

    /// Maximum pending tasks in the pool queue.
    queue_capacity: usize,

    /// Connection table capacity.
    max_connections: usize,

    /// Maximum events drained per multiplexer wait.
    max_events: usize,

    /// Housekeeping cadence; the idle timeout is three ticks.
    tick_interval: Duration,

    /// The protocol to run; required.
    service: Option<Arc<dyn Service>>,
}

impl ServerBuilder {
    /// Creates a builder with default limits for the given port.
    pub fn new(port: u16) -> Self {
        Self {
            port,
            worker_threads: 8,
            queue_capacity: 10_000,
            max_connections: 65_536,
            max_events: 10_000,
            tick_interval: Duration::from_secs(5),
            service: None,
        }
    }

    /// Sets the number of worker threads.
    pub fn worker_threads(mut self, n: usize) -> Self {
        self.worker_threads = n;
        self
    }

    /// Sets the task queue capacity.
    pub fn queue_capacity(mut self, n: usize) -> Self {
        self.queue_capacity = n;
        self
    }

    /// Sets the connection table capacity.
    pub fn max_connections(mut self, n: usize) -> Self {
        self.max_connections = n;
        self
    }

    /// Sets the maximum events drained per multiplexer wait.
    pub fn max_events(mut self, n: usize) -> Self {
        self.max_events = n;
        self
    }

    /// Sets the housekeeping cadence.
    ///
    /// The cadence is driven by `alarm(2)` and therefore has
    /// whole-second resolution; [`build`](Self::build) rejects
    /// intervals under one second. The idle timeout is always three
    /// ticks.
    pub fn tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    /// Installs the protocol to run against every connection.
    pub fn service<S: Service>(mut self, service: S) -> Self {
        self.service = Some(Arc::new(service));
        self
    }

    /// Validates the configuration and wires the server together.
    ///
    /// This binds the listening socket, installs the signal bridge,
    /// creates the poller, and starts the worker threads. Any failure
    /// here is fatal to startup and returned as an error; nothing is
    /// retried.
    pub fn build(self) -> Result<Server, ServerError> {
        if self.worker_threads == 0 {
            return Err(ConfigError::ZeroWorkerThreads.into());
        }
        if self.queue_capacity == 0 {
            return Err(ConfigError::ZeroQueueCapacity.into());
        }
        if self.max_connections == 0 {
            return Err(ConfigError::ZeroMaxConnections.into());
        }
        if self.max_events == 0 {
            return Err(ConfigError::ZeroMaxEvents.into());
        }
        if self.tick_interval < Duration::from_secs(1) {
            return Err(ConfigError::TickIntervalTooShort.into());
        }

        let service = self.service.ok_or(ConfigError::MissingService)?;

        let listener = Listener::bind(self.port)?;
        let local_addr = listener.local_addr()?;

        let poller = Poller::new(self.max_events)?;
        let bridge = SignalBridge::install()?;
        let notifier = bridge.notifier();

        let pool = WorkerPool::new(self.worker_threads, self.queue_capacity)?;
        let live = Arc::new(AtomicUsize::new(0));

        let reactor = Reactor::new(
            poller,
            listener,
            bridge,
            pool,
            service,
            live.clone(),
            self.tick_interval,
            self.max_connections,
            self.max_events,
        )?;

        Ok(Server::new(reactor, notifier, local_addr, live))
    }
}
