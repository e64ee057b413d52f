//! Lifecycle of a WebSocket byte stream.

/// Connection state.
///
/// A connection starts `Open` once its session is established and only moves
/// forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[non_exhaustive]
pub enum ConnectionState {
    /// Reads and writes are allowed.
    #[default]
    Open,
    /// Close was requested; the close frame is being sent.
    Closing,
    /// The connection is fully closed.
    Closed,
}

impl ConnectionState {
    /// Check if stream I/O is allowed in this state.
    ///
    /// Returns `true` only for `Open` state.
    #[must_use]
    #[inline]
    pub const fn is_open(&self) -> bool {
        matches!(self, ConnectionState::Open)
    }

    /// Check if close has been requested.
    ///
    /// Returns `true` for `Closing` or `Closed` states.
    #[must_use]
    #[inline]
    pub const fn is_closed(&self) -> bool {
        !self.is_open()
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionState::Open => write!(f, "Open"),
            ConnectionState::Closing => write!(f, "Closing"),
            ConnectionState::Closed => write!(f, "Closed"),
        }
    }
}
