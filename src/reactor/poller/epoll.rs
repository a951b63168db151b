//! Linux `epoll`-based poller implementation.
//!
//! This module provides the readiness multiplexer backing the reactor.
//!
//! Responsibilities:
//! - Register file descriptors with read/write interests
//! - Support one-shot, edge-triggered registrations for connections
//! - Block waiting for I/O readiness in bounded batches
//! - Report hangup and error conditions separately from readability
//!
//! The reactor has no eventfd waker: the signal bridge's pipe is itself
//! a registered descriptor, so signal delivery is what interrupts a
//! blocking `epoll_wait()`.

use super::common::Interest;
use crate::reactor::event::Event;

use libc::{
    EPOLL_CLOEXEC, EPOLL_CTL_ADD, EPOLL_CTL_DEL, EPOLL_CTL_MOD, EPOLLERR, EPOLLET, EPOLLHUP,
    EPOLLIN, EPOLLONESHOT, EPOLLOUT, EPOLLRDHUP, epoll_create1, epoll_ctl, epoll_event, epoll_wait,
};
use std::io;
use std::os::unix::io::RawFd;
use std::sync::Arc;
use std::time::Duration;

/// Owned epoll instance, closed when the last handle drops.
struct EpollFd(RawFd);

impl Drop for EpollFd {
    fn drop(&mut self) {
        unsafe {
            libc::close(self.0);
        }
    }
}

/// Linux `epoll` poller.
///
/// The poller owns the epoll instance and a reusable event buffer sized
/// to the maximum batch. Only the reactor thread calls
/// [`poll`](Self::poll); registration goes through [`Registry`] handles,
/// which may be cloned into worker threads (`epoll_ctl` is safe to call
/// concurrently with `epoll_wait`).
pub(crate) struct Poller {
    /// Shared epoll instance.
    epoll: Arc<EpollFd>,

    /// Reusable buffer for epoll events.
    events: Vec<epoll_event>,
}

/// Cheaply clonable registration handle for the poller.
///
/// Workers use their clone to re-arm a connection's one-shot interest
/// after processing; the reactor uses its own for everything else.
#[derive(Clone)]
pub(crate) struct Registry {
    epoll: Arc<EpollFd>,
}

/// Converts an [`Interest`] to epoll flags.
///
/// Read interest always includes `EPOLLRDHUP` so a peer half-close is
/// reported as a hangup condition rather than an endless readable
/// event. One-shot interest adds `EPOLLONESHOT | EPOLLET`.
fn interest_flags(interest: Interest) -> u32 {
    let mut flags = 0;

    if interest.read {
        flags |= EPOLLIN | EPOLLRDHUP;
    }
    if interest.write {
        flags |= EPOLLOUT;
    }
    if interest.oneshot {
        flags |= EPOLLONESHOT | EPOLLET;
    }

    flags as u32
}

impl Poller {
    /// Creates a new `Poller` with the given maximum event batch size.
    pub(crate) fn new(max_events: usize) -> io::Result<Self> {
        let epoll = unsafe { epoll_create1(EPOLL_CLOEXEC) };
        if epoll < 0 {
            return Err(io::Error::last_os_error());
        }

        Ok(Self {
            epoll: Arc::new(EpollFd(epoll)),
            events: Vec::with_capacity(max_events),
        })
    }

    /// Returns a registration handle for this poller.
    pub(crate) fn registry(&self) -> Registry {
        Registry {
            epoll: self.epoll.clone(),
        }
    }

    /// Polls for I/O readiness events.
    ///
    /// Blocks until at least one registered descriptor becomes ready or
    /// the optional timeout expires. A wait interrupted by a signal
    /// (`EINTR`) produces an empty batch, not an error; the interrupting
    /// signal is observed through the signal bridge's descriptor on the
    /// next wait.
    pub(crate) fn poll(
        &mut self,
        events: &mut Vec<Event>,
        timeout: Option<Duration>,
    ) -> io::Result<()> {
        let timeout_ms = timeout.map(|t| t.as_millis() as i32).unwrap_or(-1);

        events.clear();

        unsafe {
            self.events.set_len(self.events.capacity());
        }

        let n = unsafe {
            epoll_wait(
                self.epoll.0,
                self.events.as_mut_ptr(),
                self.events.capacity() as i32,
                timeout_ms,
            )
        };

        if n < 0 {
            unsafe {
                self.events.set_len(0);
            }

            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                return Ok(());
            }
            return Err(err);
        }

        unsafe {
            self.events.set_len(n as usize);
        }

        for ev in &self.events {
            let readable = ev.events & (EPOLLIN as u32) != 0;
            let writable = ev.events & (EPOLLOUT as u32) != 0;
            let closed = ev.events & ((EPOLLRDHUP | EPOLLHUP | EPOLLERR) as u32) != 0;

            events.push(Event {
                token: ev.u64 as usize,
                readable,
                writable,
                closed,
            });
        }

        Ok(())
    }
}

impl Registry {
    /// Registers a file descriptor with the poller.
    pub(crate) fn register(&self, fd: RawFd, token: usize, interest: Interest) -> io::Result<()> {
        let mut event = epoll_event {
            events: interest_flags(interest),
            u64: token as u64,
        };

        let rc = unsafe { epoll_ctl(self.epoll.0, EPOLL_CTL_ADD, fd, &mut event) };
        if rc < 0 {
            Err(io::Error::last_os_error())
        } else {
            Ok(())
        }
    }

    /// Re-arms an already registered descriptor with new interest.
    ///
    /// This is the one-shot re-arm path: after a one-shot event fires,
    /// the descriptor stays registered but disarmed until this call.
    pub(crate) fn reregister(&self, fd: RawFd, token: usize, interest: Interest) -> io::Result<()> {
        let mut event = epoll_event {
            events: interest_flags(interest),
            u64: token as u64,
        };

        let rc = unsafe { epoll_ctl(self.epoll.0, EPOLL_CTL_MOD, fd, &mut event) };
        if rc < 0 {
            Err(io::Error::last_os_error())
        } else {
            Ok(())
        }
    }

    /// Removes a file descriptor from the poller.
    pub(crate) fn deregister(&self, fd: RawFd) -> io::Result<()> {
        let rc = unsafe { epoll_ctl(self.epoll.0, EPOLL_CTL_DEL, fd, std::ptr::null_mut()) };
        if rc < 0 {
            Err(io::Error::last_os_error())
        } else {
            Ok(())
        }
    }
}
