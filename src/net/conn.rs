use crate::pool::Task;
use crate::reactor::poller::platform::{sys_read, sys_write};
use crate::reactor::poller::{Interest, Registry};
use crate::service::{Outcome, Service};

use std::io;
use std::net::SocketAddr;
use std::os::fd::RawFd;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

/// Upper bound on the buffered request size.
///
/// A connection whose peer sends more than this without completing a
/// request is treated as a read failure and torn down.
const READ_LIMIT: usize = 64 * 1024;

/// Bytes drained from the socket per `read(2)` call.
const READ_CHUNK: usize = 4096;

/// Result of flushing a connection's write buffer.
pub(crate) enum WriteOutcome {
    /// The buffer was flushed completely. With `keep_alive` the
    /// reactor re-arms read interest; otherwise it tears down.
    Done { keep_alive: bool },

    /// The socket stopped accepting data; write interest must be
    /// re-armed and the flush resumed on the next writable event.
    Pending,

    /// A fatal write error; the connection must be torn down.
    Failed,
}

/// Buffered I/O state of a connection.
///
/// Guarded by a mutex although it is never contended: the one-shot
/// registration discipline means at most one of the reactor or a
/// single worker owns the connection at any instant, and the lock makes
/// that hand-off sound.
struct ConnIo {
    /// Request bytes accumulated so far.
    read_buf: Vec<u8>,

    /// Response bytes not yet flushed.
    write_buf: Vec<u8>,

    /// Prefix of `write_buf` already written to the socket.
    written: usize,

    /// Whether to keep the connection open after the current flush.
    keep_alive: bool,
}

/// One accepted client connection.
///
/// A `Connection` is created when an accept succeeds, lives in the
/// connection table slot named by its descriptor, and is shared with
/// worker threads via `Arc` while a task referencing it is queued or
/// running. The reactor-side bookkeeping (the timer handle) lives in
/// the table slot, not here.
pub(crate) struct Connection {
    /// Socket descriptor; also the connection's identity and poller
    /// token for its open lifetime.
    fd: RawFd,

    /// Peer address, captured at accept time.
    peer: SocketAddr,

    /// Registration handle used to re-arm one-shot interest.
    registry: Registry,

    /// The protocol run against this connection.
    service: Arc<dyn Service>,

    /// Set by the reactor before submission, cleared by the worker
    /// after processing. The expiry sweep must not tear down a
    /// connection while this is set.
    in_flight: AtomicBool,

    /// Set once by tear-down; guards against double close.
    closed: AtomicBool,

    /// Buffered I/O state.
    io: Mutex<ConnIo>,
}

impl Connection {
    /// Wraps an accepted, non-blocking socket.
    pub(crate) fn new(
        fd: RawFd,
        peer: SocketAddr,
        registry: Registry,
        service: Arc<dyn Service>,
    ) -> Self {
        Self {
            fd,
            peer,
            registry,
            service,
            in_flight: AtomicBool::new(false),
            closed: AtomicBool::new(false),
            io: Mutex::new(ConnIo {
                read_buf: Vec::new(),
                write_buf: Vec::new(),
                written: 0,
                keep_alive: false,
            }),
        }
    }

    /// Returns the connection's descriptor.
    pub(crate) fn fd(&self) -> RawFd {
        self.fd
    }

    /// Returns the peer address.
    pub(crate) fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Marks the connection as having a task queued or running.
    pub(crate) fn mark_in_flight(&self) {
        self.in_flight.store(true, Ordering::Release);
    }

    /// Clears the in-flight marker.
    pub(crate) fn clear_in_flight(&self) {
        self.in_flight.store(false, Ordering::Release);
    }

    /// Whether a task referencing this connection is queued or running.
    pub(crate) fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Marks the connection closed.
    ///
    /// Returns `false` if it was already closed, so tear-down runs at
    /// most once.
    pub(crate) fn mark_closed(&self) -> bool {
        !self.closed.swap(true, Ordering::AcqRel)
    }

    /// Drains the socket into the read buffer.
    ///
    /// Reads until `WouldBlock`, as the edge-triggered registration
    /// requires. Returns `false` on EOF, on a fatal error, or when the
    /// buffered request exceeds [`READ_LIMIT`]; the caller tears the
    /// connection down in all three cases.
    pub(crate) fn read(&self) -> bool {
        let mut io = self.io.lock().unwrap();
        let mut chunk = [0u8; READ_CHUNK];

        loop {
            if io.read_buf.len() >= READ_LIMIT {
                warn!(fd = self.fd, "request exceeds read limit");
                return false;
            }

            let n = sys_read(self.fd, &mut chunk);

            match n {
                1.. => {
                    io.read_buf.extend_from_slice(&chunk[..n as usize]);
                }
                0 => {
                    // Peer closed its end.
                    return false;
                }
                _ => {
                    let err = io::Error::last_os_error();

                    return match err.kind() {
                        io::ErrorKind::WouldBlock => true,
                        io::ErrorKind::Interrupted => continue,
                        _ => {
                            debug!(fd = self.fd, error = %err, "read failed");
                            false
                        }
                    };
                }
            }
        }
    }

    /// Flushes the write buffer to the socket.
    ///
    /// On completion both buffers are reset so a kept-alive connection
    /// starts its next request clean.
    pub(crate) fn write(&self) -> WriteOutcome {
        let mut io = self.io.lock().unwrap();

        while io.written < io.write_buf.len() {
            let n = sys_write(self.fd, &io.write_buf[io.written..]);

            if n > 0 {
                io.written += n as usize;
            } else {
                let err = io::Error::last_os_error();

                match err.kind() {
                    io::ErrorKind::WouldBlock => return WriteOutcome::Pending,
                    io::ErrorKind::Interrupted => continue,
                    _ => {
                        debug!(fd = self.fd, error = %err, "write failed");
                        return WriteOutcome::Failed;
                    }
                }
            }
        }

        io.write_buf.clear();
        io.written = 0;

        WriteOutcome::Done {
            keep_alive: io.keep_alive,
        }
    }

    /// Runs the protocol over the buffered request.
    ///
    /// Called from a worker thread only. Re-arms the descriptor's
    /// one-shot interest according to the outcome, then clears the
    /// in-flight marker, in that order: the descriptor must not become
    /// reapable while its next event is still being armed.
    fn process(&self) {
        if self.closed.load(Ordering::Acquire) {
            self.clear_in_flight();
            return;
        }

        let interest = {
            let mut io = self.io.lock().unwrap();

            match self.service.respond(&io.read_buf) {
                Outcome::Incomplete => Interest::READ_ONESHOT,
                Outcome::Response { body, keep_alive } => {
                    io.read_buf.clear();
                    io.write_buf = body;
                    io.written = 0;
                    io.keep_alive = keep_alive;

                    Interest::WRITE_ONESHOT
                }
            }
        };

        if let Err(err) = self
            .registry
            .reregister(self.fd, self.fd as usize, interest)
        {
            debug!(fd = self.fd, error = %err, "re-arm failed");
        }

        self.clear_in_flight();
    }
}

impl Task for Connection {
    /// Pool entry point: one queued readiness event, one `process`.
    fn run(&self) {
        self.process();
    }
}
