//! Addresses reported by WebSocket byte streams.
//!
//! A WebSocket connection does not always know a meaningful network address:
//! TLS wrappers hide the socket, in-memory transports have none. [`WsAddr`]
//! carries whatever is available and never fails to produce a value.

use std::fmt;
use std::net::SocketAddr;

use tokio::io::DuplexStream;
use tokio::net::TcpStream;
use tokio_tungstenite::MaybeTlsStream;
use url::Url;

/// Address of one end of a WebSocket byte stream.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WsAddr {
    /// A socket address reported by the transport.
    Socket(SocketAddr),
    /// The URL the connection was dialed against.
    Url(Url),
    /// Nothing is known about this end.
    Unknown,
}

impl WsAddr {
    /// Network name, always `"websocket"`.
    #[must_use]
    pub const fn network(&self) -> &'static str {
        "websocket"
    }

    /// The socket address, if the transport reported one.
    #[must_use]
    pub const fn socket_addr(&self) -> Option<SocketAddr> {
        match self {
            WsAddr::Socket(addr) => Some(*addr),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_unknown(&self) -> bool {
        matches!(self, WsAddr::Unknown)
    }
}

impl From<SocketAddr> for WsAddr {
    fn from(addr: SocketAddr) -> Self {
        WsAddr::Socket(addr)
    }
}

impl fmt::Display for WsAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WsAddr::Socket(addr) => write!(f, "{addr}"),
            WsAddr::Url(url) => f.write_str(url.as_str()),
            WsAddr::Unknown => f.write_str("unknown-addr"),
        }
    }
}

/// Transports that may know their socket addresses.
///
/// Both methods default to `None`, so opaque transports implement the trait
/// with an empty body.
pub trait TransportAddrs {
    /// Local socket address, or `None` when the transport has none to report.
    fn local_addr(&self) -> Option<SocketAddr> {
        None
    }

    /// Peer socket address, or `None` when the transport has none to report.
    fn peer_addr(&self) -> Option<SocketAddr> {
        None
    }
}

impl TransportAddrs for TcpStream {
    fn local_addr(&self) -> Option<SocketAddr> {
        TcpStream::local_addr(self).ok()
    }

    fn peer_addr(&self) -> Option<SocketAddr> {
        TcpStream::peer_addr(self).ok()
    }
}

impl TransportAddrs for MaybeTlsStream<TcpStream> {
    fn local_addr(&self) -> Option<SocketAddr> {
        match self {
            MaybeTlsStream::Plain(stream) => stream.local_addr().ok(),
            #[cfg(feature = "tls-rustls")]
            MaybeTlsStream::Rustls(stream) => stream.get_ref().0.local_addr().ok(),
            _ => None,
        }
    }

    fn peer_addr(&self) -> Option<SocketAddr> {
        match self {
            MaybeTlsStream::Plain(stream) => stream.peer_addr().ok(),
            #[cfg(feature = "tls-rustls")]
            MaybeTlsStream::Rustls(stream) => stream.get_ref().0.peer_addr().ok(),
            _ => None,
        }
    }
}

impl TransportAddrs for DuplexStream {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let addr: WsAddr = "127.0.0.1:9001".parse::<SocketAddr>().unwrap().into();
        assert_eq!(addr.to_string(), "127.0.0.1:9001");

        let url = Url::parse("ws://example.com/chat").unwrap();
        assert_eq!(WsAddr::Url(url).to_string(), "ws://example.com/chat");

        assert_eq!(WsAddr::Unknown.to_string(), "unknown-addr");
    }

    #[test]
    fn test_network_and_socket_addr() {
        let socket: SocketAddr = "[::1]:80".parse().unwrap();
        let addr = WsAddr::Socket(socket);
        assert_eq!(addr.network(), "websocket");
        assert_eq!(addr.socket_addr(), Some(socket));
        assert!(!addr.is_unknown());

        assert_eq!(WsAddr::Unknown.socket_addr(), None);
        assert!(WsAddr::Unknown.is_unknown());
    }

    #[tokio::test]
    async fn test_duplex_has_no_addrs() {
        let (a, _b) = tokio::io::duplex(64);
        assert!(TransportAddrs::local_addr(&a).is_none());
        assert!(TransportAddrs::peer_addr(&a).is_none());
    }

    #[tokio::test]
    async fn test_tcp_addrs() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let server_addr = listener.local_addr().unwrap();
        let client = TcpStream::connect(server_addr).await.unwrap();

        assert_eq!(TransportAddrs::peer_addr(&client), Some(server_addr));
        let plain = MaybeTlsStream::Plain(client);
        assert_eq!(TransportAddrs::peer_addr(&plain), Some(server_addr));
        assert!(TransportAddrs::local_addr(&plain).is_some());
    }
}
