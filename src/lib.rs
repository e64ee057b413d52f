//! # wsconn - WebSocket sessions as byte streams
//!
//! `wsconn` dials a WebSocket endpoint and hands back a [`WsConn`], which
//! implements tokio's `AsyncRead` and `AsyncWrite`. Code written against
//! generic byte streams can run over WebSocket without knowing about
//! messages.
//!
//! ## Features
//!
//! - **Stream contract**: reads, writes, flush and shutdown via tokio's I/O traits
//! - **Deadlines**: per-direction absolute deadlines that fail pending I/O with `TimedOut`
//! - **Close signal**: a one-shot `CancellationToken` fired when the stream closes
//! - **Opt-in keep-alive** pings driven from the I/O path
//! - **TLS** for `wss://` through the `tls-rustls` or `tls-native` features
//!
//! The WebSocket protocol itself is handled by `tokio-tungstenite`.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tokio::io::{AsyncReadExt, AsyncWriteExt};
//! use wsconn::WsConn;
//!
//! let mut conn = WsConn::connect("ws://127.0.0.1:9001").await?;
//! conn.write_all(b"hello").await?;
//! let mut reply = [0u8; 5];
//! conn.read_exact(&mut reply).await?;
//! conn.close().await?;
//! ```

pub mod addr;
pub mod config;
pub mod connection;
pub mod endpoint;
pub mod error;

pub use addr::{TransportAddrs, WsAddr};
pub use config::{Config, Limits, MessageType};
pub use connection::{ConnectionState, WsConn};
pub use endpoint::{Endpoint, IntoWsUrl};
pub use error::{Error, Result};

pub use tokio_util::sync::CancellationToken;

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::DuplexStream;
    use tokio::net::TcpStream;
    use tokio_tungstenite::MaybeTlsStream;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn test_public_types_are_send() {
        assert_send::<Error>();
        assert_send::<Config>();
        assert_send::<Limits>();
        assert_send::<Endpoint>();
        assert_send::<WsAddr>();
        assert_send::<ConnectionState>();
        assert_send::<WsConn<DuplexStream>>();
        assert_send::<WsConn<MaybeTlsStream<TcpStream>>>();
    }

    #[test]
    fn test_public_types_are_sync() {
        assert_sync::<Error>();
        assert_sync::<Config>();
        assert_sync::<Limits>();
        assert_sync::<Endpoint>();
        assert_sync::<WsAddr>();
        assert_sync::<ConnectionState>();
    }
}
