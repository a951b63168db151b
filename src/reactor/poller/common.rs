/// Readiness interest for a registered file descriptor.
///
/// `oneshot` requests one-shot, edge-triggered delivery: the descriptor
/// is disarmed after each reported event and must be explicitly
/// re-armed. Connection descriptors always use it, which is what keeps
/// a connection owned by at most one of the reactor or a single worker
/// at any instant. The listener and the signal pipe are registered
/// level-triggered and persistent.
#[derive(Clone, Copy)]
pub(crate) struct Interest {
    pub(crate) read: bool,
    pub(crate) write: bool,
    pub(crate) oneshot: bool,
}

impl Interest {
    /// Persistent, level-triggered read interest.
    pub(crate) const READ: Interest = Interest {
        read: true,
        write: false,
        oneshot: false,
    };

    /// One-shot, edge-triggered read interest.
    pub(crate) const READ_ONESHOT: Interest = Interest {
        read: true,
        write: false,
        oneshot: true,
    };

    /// One-shot, edge-triggered write interest.
    pub(crate) const WRITE_ONESHOT: Interest = Interest {
        read: false,
        write: true,
        oneshot: true,
    };
}
