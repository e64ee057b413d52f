//! WebSocket sessions as byte streams.
//!
//! This module provides the `WsConn` type, which turns a message-oriented
//! WebSocket session into an `AsyncRead + AsyncWrite` stream with deadlines,
//! optional keep-alive pings and a close signal.
//!
//! ## Connection Lifecycle
//!
//! 1. **Open** - Initial state after a successful dial
//! 2. **Closing** - Close requested, close frame being sent
//! 3. **Closed** - Connection fully closed
//!
//! ## Example
//!
//! ```rust,ignore
//! use tokio::io::AsyncWriteExt;
//! use wsconn::{Config, WsConn};
//!
//! let mut conn = WsConn::connect_with_config("wss://example.com/tunnel", Config::default()).await?;
//! let closed = conn.close_signal();
//!
//! conn.write_all(b"hello").await?;
//! conn.close().await?;
//! assert!(closed.is_cancelled());
//! ```

mod deadline;
mod dial;
mod keepalive;
mod state;

pub use state::ConnectionState;

#[allow(clippy::module_inception)]
mod connection;

pub use connection::WsConn;
