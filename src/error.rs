//! Error types for establishing and closing WebSocket byte streams.
//!
//! Construction and [`close`](crate::WsConn::close) report [`Error`]. Stream
//! I/O goes through `AsyncRead`/`AsyncWrite` and therefore reports
//! [`std::io::Error`]; [`into_io_error`] is the single place where the
//! collaborator's errors are translated for that path.

use std::io;
use std::time::Duration;

use thiserror::Error;
use tokio_tungstenite::tungstenite;

/// Result type alias for adapter operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while dialing or closing a connection.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// The supplied value is not a usable `ws://` or `wss://` URL.
    #[error("Invalid WebSocket URL: {0}")]
    InvalidUrl(String),

    /// The configuration cannot be applied.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The server answered the upgrade request with something other than 101.
    #[error("Handshake rejected: {0}")]
    Handshake(String),

    /// The dial did not finish within the configured timeout.
    #[error("Dial timed out after {0:?}")]
    DialTimeout(Duration),

    /// The dial was cancelled by its cancellation token.
    #[error("Dial cancelled")]
    Cancelled,

    /// `close` was called on a connection that is already closing or closed.
    #[error("Connection already closed")]
    AlreadyClosed,

    /// I/O error occurred.
    #[error("I/O error: {0}")]
    Io(String),

    /// Any other failure reported by the WebSocket client.
    #[error("WebSocket error: {0}")]
    WebSocket(String),
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<tungstenite::Error> for Error {
    fn from(err: tungstenite::Error) -> Self {
        match err {
            tungstenite::Error::Io(e) => Error::Io(e.to_string()),
            tungstenite::Error::Url(e) => Error::InvalidUrl(e.to_string()),
            tungstenite::Error::Http(response) => Error::Handshake(format!(
                "HTTP status {}",
                response.status()
            )),
            tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed => {
                Error::AlreadyClosed
            }
            other => Error::WebSocket(other.to_string()),
        }
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        let kind = match err {
            Error::DialTimeout(_) => io::ErrorKind::TimedOut,
            Error::AlreadyClosed => io::ErrorKind::NotConnected,
            Error::InvalidUrl(_) | Error::InvalidConfig(_) => io::ErrorKind::InvalidInput,
            _ => io::ErrorKind::Other,
        };
        io::Error::new(kind, err)
    }
}

/// Translate a session error into the error returned from stream I/O.
///
/// Transport errors pass through untouched so callers see the original kind.
pub(crate) fn into_io_error(err: tungstenite::Error) -> io::Error {
    match err {
        tungstenite::Error::Io(e) => e,
        tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed => {
            io::Error::new(io::ErrorKind::NotConnected, err)
        }
        other => io::Error::other(other),
    }
}

pub(crate) fn not_connected() -> io::Error {
    io::Error::new(io::ErrorKind::NotConnected, "connection is closed")
}

pub(crate) fn deadline_exceeded() -> io::Error {
    io::Error::new(io::ErrorKind::TimedOut, "i/o deadline exceeded")
}
