/// An I/O event reported by the poller.
///
/// An `Event` represents readiness information for a registered
/// file descriptor. It is produced by the poller and consumed
/// by the reactor's dispatch loop.
///
/// When several conditions are set at once, the reactor dispatches in
/// priority order: `closed` first, then `readable`, then `writable`.
pub(crate) struct Event {
    /// Token associated with the registered file descriptor.
    ///
    /// The engine uses the descriptor value itself as the token, so a
    /// token identifies a connection table slot directly.
    pub(crate) token: usize,

    /// Indicates that the file descriptor is readable.
    pub(crate) readable: bool,

    /// Indicates that the file descriptor is writable.
    pub(crate) writable: bool,

    /// Indicates a hangup or error condition (`EPOLLRDHUP`, `EPOLLHUP`
    /// or `EPOLLERR`). The owning connection is torn down without
    /// further I/O.
    pub(crate) closed: bool,
}
