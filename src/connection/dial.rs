//! Establishing WebSocket byte streams.

use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, connect_async_with_config};
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::connection::WsConn;
use crate::endpoint::IntoWsUrl;
use crate::error::{Error, Result};

impl WsConn<MaybeTlsStream<TcpStream>> {
    /// Dial a WebSocket endpoint with the default configuration.
    ///
    /// ## Errors
    ///
    /// See [`connect_cancellable`](Self::connect_cancellable).
    pub async fn connect(url: impl IntoWsUrl) -> Result<Self> {
        Self::connect_with_config(url, Config::default()).await
    }

    /// Dial a WebSocket endpoint.
    ///
    /// ## Errors
    ///
    /// See [`connect_cancellable`](Self::connect_cancellable).
    pub async fn connect_with_config(url: impl IntoWsUrl, config: Config) -> Result<Self> {
        Self::connect_cancellable(url, config, &CancellationToken::new()).await
    }

    /// Dial a WebSocket endpoint, giving up when `cancel` fires or the
    /// configured dial timeout elapses.
    ///
    /// The dial is attempted once; nothing is retried.
    ///
    /// ## Errors
    ///
    /// - `Error::InvalidUrl` if `url` is not a `ws://` or `wss://` URL
    /// - `Error::InvalidConfig` if `config` fails validation
    /// - `Error::Cancelled` if `cancel` fired first
    /// - `Error::DialTimeout` if `config.dial_timeout` elapsed first
    /// - `Error::Io` for network failures
    /// - `Error::Handshake` if the server refused the upgrade
    /// - `Error::WebSocket` for other protocol failures
    pub async fn connect_cancellable(
        url: impl IntoWsUrl,
        config: Config,
        cancel: &CancellationToken,
    ) -> Result<Self> {
        let endpoint = url.into_ws_url()?;
        config.validate()?;

        tracing::debug!(url = %endpoint, "dialing websocket");
        let handshake = connect_async_with_config(
            endpoint.as_str(),
            Some(config.websocket_config()),
            config.nodelay,
        );
        let dial_timeout = config.dial_timeout;
        let dial = async move {
            match dial_timeout {
                Some(limit) => match tokio::time::timeout(limit, handshake).await {
                    Ok(outcome) => outcome.map_err(Error::from),
                    Err(_) => Err(Error::DialTimeout(limit)),
                },
                None => handshake.await.map_err(Error::from),
            }
        };

        let outcome = tokio::select! {
            biased;
            () = cancel.cancelled() => Err(Error::Cancelled),
            outcome = dial => outcome,
        };

        match outcome {
            Ok((ws, response)) => {
                tracing::debug!(url = %endpoint, status = %response.status(), "websocket connected");
                Ok(WsConn::from_websocket(ws, config).with_endpoint(endpoint))
            }
            Err(err) => {
                tracing::debug!(url = %endpoint, error = %err, "websocket dial failed");
                Err(err)
            }
        }
    }
}
