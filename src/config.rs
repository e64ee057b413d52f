//! Configuration for WebSocket byte streams.

use std::time::Duration;

use tokio_tungstenite::tungstenite::protocol::WebSocketConfig;

use crate::error::{Error, Result};

/// Which WebSocket data message type carries the stream's bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MessageType {
    /// Every write is sent as a binary message; only binary messages are read.
    #[default]
    Binary,
    /// Every write is sent as a text message; only text messages are read.
    ///
    /// Each written buffer must be valid UTF-8 on its own.
    Text,
}

/// Size limits handed to the WebSocket client.
///
/// `None` disables the corresponding check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    /// Maximum size of a complete incoming message in bytes.
    ///
    /// Default: 64 MB (64 * 1024 * 1024)
    pub max_message_size: Option<usize>,

    /// Maximum size of a single incoming frame in bytes.
    ///
    /// Default: 16 MB (16 * 1024 * 1024)
    pub max_frame_size: Option<usize>,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_message_size: Some(64 * 1024 * 1024), // 64 MB
            max_frame_size: Some(16 * 1024 * 1024),   // 16 MB
        }
    }
}

impl Limits {
    /// Create new limits with custom values.
    #[must_use]
    pub const fn new(max_message_size: Option<usize>, max_frame_size: Option<usize>) -> Self {
        Self {
            max_message_size,
            max_frame_size,
        }
    }

    /// Create limits suitable for small embedded systems.
    ///
    /// - Max message: 256 KB
    /// - Max frame: 64 KB
    #[must_use]
    pub const fn embedded() -> Self {
        Self {
            max_message_size: Some(256 * 1024),
            max_frame_size: Some(64 * 1024),
        }
    }

    /// Disable all size checks.
    ///
    /// Warning: Use only with trusted peers.
    #[must_use]
    pub const fn unrestricted() -> Self {
        Self {
            max_message_size: None,
            max_frame_size: None,
        }
    }
}

/// Byte stream configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Message type used for reads and writes.
    ///
    /// Default: [`MessageType::Binary`]
    pub message_type: MessageType,

    /// Upper bound on the whole dial: TCP connect, TLS and the upgrade.
    ///
    /// If `None`, the dial can only be abandoned through cancellation.
    /// Default: 30 seconds
    pub dial_timeout: Option<Duration>,

    /// Interval between keep-alive pings.
    ///
    /// Only acted upon when [`keepalive`](Self::keepalive) is `true`.
    /// Default: 30 seconds
    pub ping_interval: Duration,

    /// Send an empty ping every `ping_interval` while the stream is polled.
    ///
    /// Default: false
    pub keepalive: bool,

    /// Disable Nagle's algorithm on the dialed TCP socket.
    ///
    /// Default: false
    pub nodelay: bool,

    /// Incoming size limits.
    pub limits: Limits,

    /// Read buffer size (in bytes) of the WebSocket client.
    ///
    /// Default: 128 KB (128 * 1024)
    pub read_buffer_size: usize,

    /// Bytes buffered before the client writes to the socket.
    ///
    /// `0` writes every message to the socket as soon as it is accepted.
    /// Default: 0
    pub write_buffer_size: usize,

    /// Hard cap on buffered outgoing bytes. Must exceed `write_buffer_size`.
    ///
    /// Default: `usize::MAX`
    pub max_write_buffer_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            message_type: MessageType::Binary,
            dial_timeout: Some(Duration::from_secs(30)),
            ping_interval: Duration::from_secs(30),
            keepalive: false,
            nodelay: false,
            limits: Limits::default(),
            read_buffer_size: 128 * 1024,
            write_buffer_size: 0,
            max_write_buffer_size: usize::MAX,
        }
    }
}

impl Config {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure for text-mode streams.
    #[must_use]
    pub fn text() -> Self {
        Self {
            message_type: MessageType::Text,
            ..Default::default()
        }
    }

    /// Set the message type.
    #[must_use]
    pub const fn with_message_type(mut self, message_type: MessageType) -> Self {
        self.message_type = message_type;
        self
    }

    /// Set the dial timeout. `None` disables it.
    #[must_use]
    pub const fn with_dial_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.dial_timeout = timeout;
        self
    }

    /// Set the ping interval without enabling keep-alive.
    #[must_use]
    pub const fn with_ping_interval(mut self, interval: Duration) -> Self {
        self.ping_interval = interval;
        self
    }

    /// Enable keep-alive pings at the given interval.
    #[must_use]
    pub const fn with_keepalive(mut self, interval: Duration) -> Self {
        self.ping_interval = interval;
        self.keepalive = true;
        self
    }

    /// Set `TCP_NODELAY` on dialed sockets.
    #[must_use]
    pub const fn with_nodelay(mut self, nodelay: bool) -> Self {
        self.nodelay = nodelay;
        self
    }

    /// Set custom limits.
    #[must_use]
    pub const fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Set read buffer size.
    #[must_use]
    pub const fn with_read_buffer_size(mut self, size: usize) -> Self {
        self.read_buffer_size = size;
        self
    }

    /// Set write buffer size.
    #[must_use]
    pub const fn with_write_buffer_size(mut self, size: usize) -> Self {
        self.write_buffer_size = size;
        self
    }

    /// Check that the configuration can be applied.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if keep-alive is enabled with a zero
    /// interval, or if `max_write_buffer_size` does not exceed
    /// `write_buffer_size`.
    pub fn validate(&self) -> Result<()> {
        if self.keepalive && self.ping_interval.is_zero() {
            return Err(Error::InvalidConfig(
                "keep-alive requires a non-zero ping interval".into(),
            ));
        }
        if self.max_write_buffer_size <= self.write_buffer_size {
            return Err(Error::InvalidConfig(format!(
                "max_write_buffer_size ({}) must exceed write_buffer_size ({})",
                self.max_write_buffer_size, self.write_buffer_size
            )));
        }
        Ok(())
    }

    /// Build the WebSocket client configuration.
    #[must_use]
    pub fn websocket_config(&self) -> WebSocketConfig {
        WebSocketConfig::default()
            .read_buffer_size(self.read_buffer_size)
            .write_buffer_size(self.write_buffer_size)
            .max_write_buffer_size(self.max_write_buffer_size)
            .max_message_size(self.limits.max_message_size)
            .max_frame_size(self.limits.max_frame_size)
    }

    /// Ping interval to drive, if keep-alive is active.
    pub(crate) fn keepalive_interval(&self) -> Option<Duration> {
        (self.keepalive && !self.ping_interval.is_zero()).then_some(self.ping_interval)
    }
}
