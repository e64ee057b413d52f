use std::fmt;
use std::future::poll_fn;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use bytes::{Buf, Bytes};
use futures_core::Stream;
use futures_util::Sink;
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::time::Instant;
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::error::ProtocolError;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_util::sync::CancellationToken;

use crate::addr::{TransportAddrs, WsAddr};
use crate::config::{Config, MessageType};
use crate::connection::ConnectionState;
use crate::connection::deadline::Deadline;
use crate::connection::keepalive::{Direction, Keepalive};
use crate::endpoint::Endpoint;
use crate::error::{Error, Result, into_io_error, not_connected};

/// A WebSocket session exposed as a byte stream.
///
/// `WsConn` implements [`AsyncRead`] and [`AsyncWrite`] on top of a
/// [`WebSocketStream`]. Each write becomes one data message; reads return the
/// payloads of incoming data messages back to back, so message boundaries are
/// not visible to the reader.
///
/// ## Type Parameters
///
/// - `S`: The transport under the WebSocket session (e.g., `MaybeTlsStream<TcpStream>`)
///
/// ## Example
///
/// ```rust,ignore
/// use tokio::io::{AsyncReadExt, AsyncWriteExt};
/// use wsconn::WsConn;
///
/// let mut conn = WsConn::connect("ws://127.0.0.1:9001").await?;
/// conn.write_all(b"ping").await?;
///
/// let mut buf = [0u8; 4];
/// conn.read_exact(&mut buf).await?;
/// conn.close().await?;
/// ```
///
/// ## Closing
///
/// [`close`](Self::close) may be called once; a second call fails with
/// [`Error::AlreadyClosed`]. `AsyncWriteExt::shutdown` performs the same
/// transition but succeeds when repeated, as the `AsyncWrite` contract
/// requires. Either way the signal from [`close_signal`](Self::close_signal)
/// fires exactly once and every later read, write or flush fails with
/// `NotConnected`.
pub struct WsConn<S> {
    inner: WebSocketStream<S>,
    config: Config,
    endpoint: Option<Endpoint>,
    state: ConnectionState,
    read_remainder: Bytes,
    read_eof: bool,
    read_deadline: Deadline,
    write_deadline: Deadline,
    keepalive: Option<Keepalive>,
    write_pending: bool,
    closed: CancellationToken,
}

impl<S> WsConn<S> {
    /// Wrap an established WebSocket session.
    ///
    /// The session is used as is; `config` decides the message type and
    /// keep-alive behaviour. Must be called within a Tokio runtime when
    /// keep-alive is enabled.
    pub fn from_websocket(inner: WebSocketStream<S>, config: Config) -> Self {
        let keepalive = config.keepalive_interval().map(Keepalive::new);

        Self {
            inner,
            config,
            endpoint: None,
            state: ConnectionState::Open,
            read_remainder: Bytes::new(),
            read_eof: false,
            read_deadline: Deadline::default(),
            write_deadline: Deadline::default(),
            keepalive,
            write_pending: false,
            closed: CancellationToken::new(),
        }
    }

    pub(crate) fn with_endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoint = Some(endpoint);
        self
    }

    /// Get the configuration in effect.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the endpoint this connection was dialed against, if any.
    pub fn endpoint(&self) -> Option<&Endpoint> {
        self.endpoint.as_ref()
    }

    /// Get the current connection state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Check whether close has been requested.
    pub fn is_closed(&self) -> bool {
        self.state.is_closed()
    }

    /// A token that is cancelled when the connection starts closing.
    ///
    /// Cancelling the returned token does not close the connection.
    pub fn close_signal(&self) -> CancellationToken {
        self.closed.child_token()
    }

    /// Set both the read and the write deadline.
    ///
    /// Must be called within a Tokio runtime.
    pub fn set_deadline(&mut self, deadline: Option<Instant>) {
        self.read_deadline.set(deadline);
        self.write_deadline.set(deadline);
    }

    /// Set the read deadline.
    ///
    /// Once `deadline` has passed, pending and future reads fail with
    /// `io::ErrorKind::TimedOut` until the deadline is moved or cleared with
    /// `None`. Must be called within a Tokio runtime.
    pub fn set_read_deadline(&mut self, deadline: Option<Instant>) {
        self.read_deadline.set(deadline);
    }

    /// Set the write deadline. Applies to writes, flushes and keep-alive
    /// pings sent from the write path.
    ///
    /// Must be called within a Tokio runtime.
    pub fn set_write_deadline(&mut self, deadline: Option<Instant>) {
        self.write_deadline.set(deadline);
    }

    /// Get the read deadline, if one is set.
    pub fn read_deadline(&self) -> Option<Instant> {
        self.read_deadline.get()
    }

    /// Get the write deadline, if one is set.
    pub fn write_deadline(&self) -> Option<Instant> {
        self.write_deadline.get()
    }

    /// Get a reference to the underlying WebSocket session.
    pub fn get_ref(&self) -> &WebSocketStream<S> {
        &self.inner
    }

    /// Get a mutable reference to the underlying WebSocket session.
    ///
    /// Messages sent or received through it bypass the adapter.
    pub fn get_mut(&mut self) -> &mut WebSocketStream<S> {
        &mut self.inner
    }

    /// Unwrap the underlying WebSocket session.
    ///
    /// Bytes of a partially read message are dropped.
    pub fn into_inner(self) -> WebSocketStream<S> {
        self.inner
    }

    fn begin_close(&mut self) {
        tracing::debug!(endpoint = ?self.endpoint.as_ref().map(Endpoint::as_str), "closing websocket stream");
        self.state = ConnectionState::Closing;
        self.closed.cancel();
    }

    fn accept_message(&mut self, message: Message) -> io::Result<()> {
        match (message, self.config.message_type) {
            (Message::Binary(data), MessageType::Binary) => {
                tracing::trace!(len = data.len(), "binary message received");
                self.read_remainder = data;
            }
            (Message::Text(text), MessageType::Text) => {
                tracing::trace!(len = text.len(), "text message received");
                self.read_remainder = Bytes::copy_from_slice(text.as_bytes());
            }
            (Message::Text(_), MessageType::Binary) => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    "unexpected text message on a binary stream",
                ));
            }
            (Message::Binary(_), MessageType::Text) => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    "unexpected binary message on a text stream",
                ));
            }
            (Message::Close(frame), _) => {
                tracing::debug!(?frame, "peer closed websocket stream");
                self.read_eof = true;
            }
            // Pings are answered by the session itself.
            _ => {}
        }
        Ok(())
    }

    fn encode(&self, buf: &[u8]) -> io::Result<Message> {
        match self.config.message_type {
            MessageType::Binary => Ok(Message::Binary(Bytes::copy_from_slice(buf))),
            MessageType::Text => {
                let text = std::str::from_utf8(buf)
                    .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
                Ok(Message::Text(text.to_owned().into()))
            }
        }
    }
}

impl<S: TransportAddrs + AsyncRead + AsyncWrite + Unpin> WsConn<S> {
    /// Local address of the transport, or [`WsAddr::Unknown`].
    pub fn local_addr(&self) -> WsAddr {
        self.inner
            .get_ref()
            .local_addr()
            .map_or(WsAddr::Unknown, WsAddr::Socket)
    }

    /// Peer address of the transport.
    ///
    /// Falls back to the dialed URL when the transport cannot report a socket
    /// address, and to [`WsAddr::Unknown`] when neither is known.
    pub fn remote_addr(&self) -> WsAddr {
        match (self.inner.get_ref().peer_addr(), &self.endpoint) {
            (Some(addr), _) => WsAddr::Socket(addr),
            (None, Some(endpoint)) => WsAddr::Url(endpoint.as_url().clone()),
            (None, None) => WsAddr::Unknown,
        }
    }
}

impl<S: AsyncRead + AsyncWrite + Unpin> WsConn<S> {
    /// Close the connection.
    ///
    /// Fires the close signal, sends a Normal (1000) close frame and flushes
    /// it. A peer that already closed is not an error.
    ///
    /// ## Errors
    ///
    /// - `Error::AlreadyClosed` if close was already requested
    /// - I/O errors from sending the close frame
    pub async fn close(&mut self) -> Result<()> {
        if self.state.is_closed() {
            return Err(Error::AlreadyClosed);
        }

        self.begin_close();
        let frame = CloseFrame {
            code: CloseCode::Normal,
            reason: Default::default(),
        };
        let mut result = self.inner.close(Some(frame)).await;
        if matches!(
            result,
            Err(tungstenite::Error::Protocol(ProtocolError::SendAfterClosing))
        ) {
            // The peer closed first; only its close reply is left to flush.
            result = poll_fn(|cx| Pin::new(&mut self.inner).poll_close(cx)).await;
        }
        self.state = ConnectionState::Closed;
        ignore_closed(result).map_err(Error::from)
    }

    /// Push out bytes a previous write or ping left in the out-buffer.
    ///
    /// Returns `Pending` while they are still queued; the flag stays set so
    /// the next read or write resumes the flush.
    fn poll_flush_pending(&mut self, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        if !self.write_pending {
            return Poll::Ready(Ok(()));
        }
        ready!(Pin::new(&mut self.inner).poll_flush(cx)).map_err(into_io_error)?;
        self.write_pending = false;
        Poll::Ready(Ok(()))
    }

    /// Flush after queueing a message, remembering a flush that cannot finish.
    fn flush_queued(&mut self, cx: &mut Context<'_>) -> io::Result<()> {
        match Pin::new(&mut self.inner).poll_flush(cx) {
            Poll::Ready(Ok(())) => self.write_pending = false,
            Poll::Ready(Err(e)) => return Err(into_io_error(e)),
            Poll::Pending => self.write_pending = true,
        }
        Ok(())
    }

    /// Queue a ping when the keep-alive interval has elapsed and push it out.
    ///
    /// Never blocks the caller; a ping that cannot be queued yet stays due
    /// for the next poll from either direction.
    fn poll_keepalive(&mut self, cx: &mut Context<'_>, direction: Direction) -> io::Result<()> {
        let Some(keepalive) = self.keepalive.as_mut() else {
            return Ok(());
        };
        if !keepalive.poll_due(cx, direction) {
            return Ok(());
        }

        match Pin::new(&mut self.inner).poll_ready(cx) {
            Poll::Ready(Ok(())) => {}
            Poll::Ready(Err(e)) => return Err(into_io_error(e)),
            Poll::Pending => return Ok(()),
        }
        Pin::new(&mut self.inner)
            .start_send(Message::Ping(Bytes::new()))
            .map_err(into_io_error)?;
        keepalive.sent();
        tracing::trace!(?direction, "keep-alive ping sent");

        self.flush_queued(cx)
    }
}

impl<S: AsyncRead + AsyncWrite + Unpin> AsyncRead for WsConn<S> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        if this.state.is_closed() {
            return Poll::Ready(Err(not_connected()));
        }
        this.read_deadline.poll_check(cx)?;
        // Resume a pending flush without blocking the read.
        if let Poll::Ready(Err(e)) = this.poll_flush_pending(cx) {
            return Poll::Ready(Err(e));
        }
        this.poll_keepalive(cx, Direction::Read)?;

        if buf.remaining() == 0 {
            return Poll::Ready(Ok(()));
        }

        loop {
            if !this.read_remainder.is_empty() {
                let n = this.read_remainder.len().min(buf.remaining());
                buf.put_slice(&this.read_remainder[..n]);
                this.read_remainder.advance(n);
                return Poll::Ready(Ok(()));
            }
            if this.read_eof {
                return Poll::Ready(Ok(()));
            }

            match ready!(Pin::new(&mut this.inner).poll_next(cx)) {
                Some(Ok(message)) => this.accept_message(message)?,
                Some(Err(e)) => return Poll::Ready(Err(into_io_error(e))),
                None => this.read_eof = true,
            }
        }
    }
}

impl<S: AsyncRead + AsyncWrite + Unpin> AsyncWrite for WsConn<S> {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let this = self.get_mut();
        if this.state.is_closed() {
            return Poll::Ready(Err(not_connected()));
        }
        this.write_deadline.poll_check(cx)?;
        ready!(this.poll_flush_pending(cx))?;
        this.poll_keepalive(cx, Direction::Write)?;

        if buf.is_empty() {
            return Poll::Ready(Ok(0));
        }

        let message = this.encode(buf)?;
        ready!(Pin::new(&mut this.inner).poll_ready(cx)).map_err(into_io_error)?;
        Pin::new(&mut this.inner)
            .start_send(message)
            .map_err(into_io_error)?;
        tracing::trace!(len = buf.len(), "message sent");

        // The message is accepted; a flush that cannot finish now is resumed
        // by the next read, write or flush.
        this.flush_queued(cx)?;
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        if this.state.is_closed() {
            return Poll::Ready(Err(not_connected()));
        }
        this.write_deadline.poll_check(cx)?;
        ready!(Pin::new(&mut this.inner).poll_flush(cx)).map_err(into_io_error)?;
        this.write_pending = false;
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        match this.state {
            ConnectionState::Closed => return Poll::Ready(Ok(())),
            ConnectionState::Open => this.begin_close(),
            _ => {}
        }

        let result = ready!(Pin::new(&mut this.inner).poll_close(cx));
        this.state = ConnectionState::Closed;
        Poll::Ready(ignore_closed(result).map_err(into_io_error))
    }
}

impl<S> fmt::Debug for WsConn<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WsConn")
            .field("state", &self.state)
            .field("endpoint", &self.endpoint)
            .field("message_type", &self.config.message_type)
            .field("buffered", &self.read_remainder.len())
            .field("read_eof", &self.read_eof)
            .field("write_pending", &self.write_pending)
            .finish_non_exhaustive()
    }
}

fn ignore_closed(
    result: std::result::Result<(), tungstenite::Error>,
) -> std::result::Result<(), tungstenite::Error> {
    match result {
        Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => Ok(()),
        other => other,
    }
}
