//! The protocol seam.
//!
//! The engine core does not parse any wire protocol. A [`Service`]
//! receives the bytes buffered so far for a connection and decides
//! whether they form a complete request; the engine handles everything
//! around that call: readiness, buffering, timeouts, and the thread the
//! call runs on.

/// Result of a [`Service::respond`] call.
pub enum Outcome {
    /// The buffered bytes do not yet form a complete request. The
    /// engine re-arms read interest and calls again when more data
    /// arrives.
    Incomplete,

    /// A complete request was parsed and `body` is the response to
    /// flush. With `keep_alive` the connection is kept open for the
    /// next request after the flush; otherwise it is torn down.
    Response {
        /// Response bytes to write to the peer.
        body: Vec<u8>,

        /// Whether to keep the connection open after the response.
        keep_alive: bool,
    },
}

/// An application protocol plugged into the engine.
///
/// `respond` is called from worker pool threads only, never from the
/// reactor thread, and never concurrently for the same connection. It
/// runs synchronously: a slow `respond` occupies one worker but cannot
/// stall event dispatch.
pub trait Service: Send + Sync + 'static {
    /// Inspects the request bytes buffered so far and produces an
    /// [`Outcome`].
    ///
    /// The engine clears the request buffer once a `Response` is
    /// returned; until then the buffer keeps accumulating, so
    /// `respond` sees the whole request-so-far on every call.
    fn respond(&self, request: &[u8]) -> Outcome;
}
