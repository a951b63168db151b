use crate::reactor::poller::platform::{
    socketaddr_to_storage, sys_accept, sys_bind, sys_close, sys_listen, sys_set_reuseaddr,
    sys_socket, sys_sockname,
};

use libc::AF_INET;
use std::io;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::os::fd::RawFd;

/// A non-blocking TCP listening socket.
///
/// The listener is bound to `0.0.0.0:port` with `SO_REUSEADDR` set, as
/// servers of this shape conventionally are. It is registered with the
/// reactor level-triggered; the reactor drains pending connections with
/// an accept loop on every readiness event.
pub(crate) struct Listener {
    /// File descriptor of the listening socket.
    fd: RawFd,
}

impl Listener {
    /// Binds a listener to `0.0.0.0:port`.
    ///
    /// This creates a non-blocking socket, enables `SO_REUSEADDR`,
    /// binds, and starts listening. Pass port `0` to let the kernel
    /// pick a free port (used by tests).
    pub(crate) fn bind(port: u16) -> io::Result<Self> {
        let addr = SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, port));
        let (storage, len) = socketaddr_to_storage(&addr);

        let fd = sys_socket(AF_INET)?;

        let setup = sys_set_reuseaddr(fd)
            .and_then(|()| sys_bind(fd, &storage, len))
            .and_then(|()| sys_listen(fd));

        if let Err(e) = setup {
            sys_close(fd);
            return Err(e);
        }

        Ok(Self { fd })
    }

    /// Accepts one pending connection.
    ///
    /// The returned descriptor is already non-blocking. `WouldBlock`
    /// means the pending queue is drained.
    pub(crate) fn accept(&self) -> io::Result<(RawFd, SocketAddr)> {
        sys_accept(self.fd)
    }

    /// Returns the listening socket's descriptor.
    pub(crate) fn fd(&self) -> RawFd {
        self.fd
    }

    /// Returns the local socket address of this listener.
    pub(crate) fn local_addr(&self) -> io::Result<SocketAddr> {
        sys_sockname(self.fd)
    }
}

impl Drop for Listener {
    /// Closes the listening socket.
    fn drop(&mut self) {
        sys_close(self.fd);
    }
}
