use super::event::Event;
use super::poller::platform::sys_close;
use super::poller::{Interest, Poller, Registry};
use crate::net::{Connection, Listener, WriteOutcome};
use crate::pool::WorkerPool;
use crate::service::Service;
use crate::signal::{self, SignalBridge};
use crate::timer::{ExpiryList, TimerId};

use std::io;
use std::net::SocketAddr;
use std::os::fd::RawFd;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

/// A connection's idle deadline is this many housekeeping ticks out.
const IDLE_TICKS: u32 = 3;

/// Minimum span of the fd-indexed connection table.
///
/// Descriptor values index the table directly, so the table must cover
/// the descriptor range even when the connection cap is set low. A
/// descriptor beyond the table is refused at accept.
const MIN_TABLE_SPAN: usize = 65_536;

/// Reactor-side bookkeeping for one connection table slot.
struct ConnSlot {
    /// The connection, shared with workers while a task is in flight.
    conn: Arc<Connection>,

    /// Handle of the connection's idle timer, while one is pending.
    timer: Option<TimerId>,
}

/// The event reactor.
///
/// Owns the listening socket, the readiness multiplexer, the signal
/// bridge, the expiry list, and the connection table. The reactor runs
/// on a single thread and never blocks anywhere but the multiplexer
/// wait; everything slow is handed to the worker pool.
pub(crate) struct Reactor {
    /// The readiness multiplexer.
    poller: Poller,

    /// Registration handle, also cloned into every connection.
    registry: Registry,

    /// The listening socket.
    listener: Listener,

    /// The signal bridge; its read end is a registered descriptor.
    bridge: SignalBridge,

    /// Idle-connection deadlines, swept on the housekeeping cadence.
    timers: ExpiryList,

    /// Connection table indexed by descriptor value.
    table: Vec<Option<ConnSlot>>,

    /// Worker pool executing connection tasks.
    pool: WorkerPool<Connection>,

    /// The protocol handed to every accepted connection.
    service: Arc<dyn Service>,

    /// Number of open connections, shared for outside observation.
    live: Arc<AtomicUsize>,

    /// Housekeeping cadence; also re-armed into `alarm(2)` after every
    /// sweep.
    tick_interval: Duration,

    /// Maximum number of open connections.
    max_connections: usize,

    /// Maximum events drained per multiplexer wait.
    max_events: usize,

    /// Token of the listening descriptor.
    listener_token: usize,

    /// Token of the signal bridge's read end.
    bridge_token: usize,
}

impl Reactor {
    /// Wires the reactor together and registers the two persistent
    /// descriptors: the listener and the signal bridge's read end.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        poller: Poller,
        listener: Listener,
        bridge: SignalBridge,
        pool: WorkerPool<Connection>,
        service: Arc<dyn Service>,
        live: Arc<AtomicUsize>,
        tick_interval: Duration,
        max_connections: usize,
        max_events: usize,
    ) -> io::Result<Self> {
        let registry = poller.registry();

        let listener_token = listener.fd() as usize;
        let bridge_token = bridge.fd() as usize;

        registry.register(listener.fd(), listener_token, Interest::READ)?;
        registry.register(bridge.fd(), bridge_token, Interest::READ)?;

        let mut table = Vec::new();
        table.resize_with(max_connections.max(MIN_TABLE_SPAN), || None);

        Ok(Self {
            poller,
            registry,
            listener,
            bridge,
            timers: ExpiryList::new(),
            table,
            pool,
            service,
            live,
            tick_interval,
            max_connections,
            max_events,
            listener_token,
            bridge_token,
        })
    }

    /// The idle timeout applied to connections.
    fn idle_timeout(&self) -> Duration {
        self.tick_interval * IDLE_TICKS
    }

    /// Runs the event loop until a stop request arrives.
    ///
    /// Each iteration blocks in the multiplexer with no timeout (the
    /// housekeeping cadence comes from `SIGALRM`, not a poll timeout),
    /// dispatches the whole ready batch, and only then handles the
    /// deferred sweep and stop flags. The sweep is deferred on purpose:
    /// I/O dispatch has priority over housekeeping, at the cost of a
    /// less punctual sweep under sustained load.
    pub(crate) fn run(mut self) -> io::Result<()> {
        let mut events = Vec::with_capacity(self.max_events);
        let mut sweep_due = false;
        let mut stop = false;

        signal::arm_alarm(self.tick_interval);
        info!("reactor running");

        while !stop {
            self.poller.poll(&mut events, None)?;

            for event in &events {
                if event.token == self.listener_token {
                    self.accept_ready();
                } else if event.token == self.bridge_token {
                    let drained = self.bridge.drain();
                    sweep_due |= drained.sweep;
                    stop |= drained.stop;
                } else {
                    self.conn_ready(event);
                }
            }

            if sweep_due {
                self.sweep(Instant::now());
                signal::arm_alarm(self.tick_interval);
                sweep_due = false;
            }
        }

        self.stop_all();

        Ok(())
    }

    /// Drains the listener's pending-connection queue.
    ///
    /// A failed accept is logged and skipped, never fatal: the peer may
    /// have gone away between readiness and accept.
    fn accept_ready(&mut self) {
        loop {
            match self.listener.accept() {
                Ok((fd, peer)) => self.admit(fd, peer),
                Err(err) => {
                    match err.kind() {
                        io::ErrorKind::WouldBlock => {}
                        io::ErrorKind::Interrupted => continue,
                        _ => warn!(error = %err, "accept failed"),
                    }
                    break;
                }
            }
        }
    }

    /// Admits one accepted socket, or closes it at capacity.
    ///
    /// An admitted connection gets a table slot keyed by its
    /// descriptor, an idle timer, and a one-shot edge-triggered read
    /// registration. At capacity the descriptor is closed immediately:
    /// no slot, no timer, no registration.
    fn admit(&mut self, fd: RawFd, peer: SocketAddr) {
        let token = fd as usize;

        if self.live.load(Ordering::Relaxed) >= self.max_connections || token >= self.table.len() {
            warn!(fd, peer = %peer, "connection capacity reached, closing");
            sys_close(fd);
            return;
        }

        let conn = Arc::new(Connection::new(
            fd,
            peer,
            self.registry.clone(),
            self.service.clone(),
        ));

        if let Err(err) = self.registry.register(fd, token, Interest::READ_ONESHOT) {
            warn!(fd, error = %err, "register failed, closing");
            sys_close(fd);
            return;
        }

        let timer = self.timers.add(token, Instant::now() + self.idle_timeout());

        info!(fd, peer = %conn.peer(), "connection accepted");

        self.table[token] = Some(ConnSlot {
            conn,
            timer: Some(timer),
        });
        self.live.fetch_add(1, Ordering::Relaxed);
    }

    /// Dispatches a readiness event for a connection descriptor.
    ///
    /// Priority when several conditions are set at once: hangup/error
    /// first, then readable, then writable.
    fn conn_ready(&mut self, event: &Event) {
        let token = event.token;

        let conn = match self.table.get(token).and_then(|slot| slot.as_ref()) {
            Some(slot) => slot.conn.clone(),
            // Stale event for a slot already torn down.
            None => return,
        };

        if event.closed {
            self.teardown(token);
            return;
        }

        if event.readable {
            // Fresh activity pushes the idle deadline out.
            self.refresh_timer(token);

            if conn.read() {
                conn.mark_in_flight();

                if self.pool.submit(conn.clone()).is_err() {
                    // A rejected connection would stay registered but
                    // never be serviced; close it instead.
                    conn.clear_in_flight();
                    warn!(fd = token, "task queue saturated, closing connection");
                    self.teardown(token);
                }
            } else {
                self.teardown(token);
            }

            return;
        }

        if event.writable {
            match conn.write() {
                WriteOutcome::Done { keep_alive: true } => {
                    self.refresh_timer(token);

                    if let Err(err) =
                        self.registry
                            .reregister(conn.fd(), token, Interest::READ_ONESHOT)
                    {
                        warn!(fd = token, error = %err, "re-arm failed, closing");
                        self.teardown(token);
                    }
                }
                WriteOutcome::Done { keep_alive: false } => self.teardown(token),
                WriteOutcome::Pending => {
                    if let Err(err) =
                        self.registry
                            .reregister(conn.fd(), token, Interest::WRITE_ONESHOT)
                    {
                        warn!(fd = token, error = %err, "re-arm failed, closing");
                        self.teardown(token);
                    }
                }
                WriteOutcome::Failed => self.teardown(token),
            }
        }
    }

    /// Pushes a connection's idle deadline out by the full timeout.
    fn refresh_timer(&mut self, token: usize) {
        let deadline = Instant::now() + self.idle_timeout();

        if let Some(slot) = self.table[token].as_mut() {
            if let Some(timer) = slot.timer.take() {
                slot.timer = Some(self.timers.adjust(timer, deadline));
            }
        }
    }

    /// The single tear-down routine; every close path ends here.
    ///
    /// Removing the timer is the first step, so no close path can leave
    /// a dangling deadline referencing a reused table slot. The slot is
    /// taken out of the table before anything else, which makes a
    /// second tear-down of the same token a no-op.
    fn teardown(&mut self, token: usize) {
        let Some(slot) = self.table[token].take() else {
            return;
        };

        if let Some(timer) = slot.timer {
            self.timers.remove(timer);
        }

        // Stops a still-queued worker task from touching the socket.
        slot.conn.mark_closed();

        let fd = slot.conn.fd();
        let _ = self.registry.deregister(fd);
        sys_close(fd);

        self.live.fetch_sub(1, Ordering::Relaxed);

        info!(fd, "connection closed");
    }

    /// Reaps every connection whose idle deadline has passed.
    ///
    /// A connection with a task queued or mid-processing is not torn
    /// down under the worker's feet; its deadline is pushed one tick
    /// out and re-checked on the next sweep.
    fn sweep(&mut self, now: Instant) {
        for token in self.timers.tick(now) {
            let in_flight = match self.table[token].as_mut() {
                Some(slot) => {
                    // The tick already consumed the timer node.
                    slot.timer = None;
                    slot.conn.is_in_flight()
                }
                None => continue,
            };

            if in_flight {
                debug!(fd = token, "expiry deferred, task in flight");

                let timer = self.timers.add(token, now + self.tick_interval);
                if let Some(slot) = self.table[token].as_mut() {
                    slot.timer = Some(timer);
                }
            } else {
                info!(fd = token, "idle timeout");
                self.teardown(token);
            }
        }
    }

    /// Releases everything after the loop exits.
    ///
    /// Order matters: connections are torn down first (their tasks may
    /// still be queued), then the pool is joined so no worker outlives
    /// the sockets, then the bridge, listener and poller close on drop.
    fn stop_all(mut self) {
        info!("reactor stopping");

        for token in 0..self.table.len() {
            if self.table[token].is_some() {
                self.teardown(token);
            }
        }

        self.pool.shutdown();

        info!("reactor stopped");
    }
}
