//! WebSocket echo server for trying out the client demo.
//!
//! Run with: cargo run --example echo_server
//! Then connect with: cargo run --example client

use std::error::Error;

use futures::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;

const ADDR: &str = "127.0.0.1:9001";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let listener = TcpListener::bind(ADDR).await?;
    tracing::info!(addr = ADDR, "echo server listening");

    loop {
        let (stream, addr) = listener.accept().await?;
        tracing::info!(%addr, "new connection");

        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream).await {
                tracing::warn!(%addr, error = %e, "connection error");
            }
        });
    }
}

async fn handle_connection(stream: TcpStream) -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut ws = tokio_tungstenite::accept_async(stream).await?;

    while let Some(msg) = ws.next().await {
        match msg? {
            msg @ (Message::Binary(_) | Message::Text(_)) => {
                tracing::info!(len = msg.len(), "echoing message");
                ws.send(msg).await?;
            }
            Message::Close(frame) => {
                tracing::info!(?frame, "peer closed");
                break;
            }
            _ => {}
        }
    }

    Ok(())
}
