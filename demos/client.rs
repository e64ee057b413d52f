//! Byte stream client for the echo server demo.
//!
//! Run with: cargo run --example client [ws://host:port/path]

use std::error::Error;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::time::Instant;
use wsconn::{Config, WsConn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "ws://127.0.0.1:9001".to_string());

    let config = Config::new()
        .with_dial_timeout(Some(Duration::from_secs(5)))
        .with_keepalive(Duration::from_secs(15));
    let mut conn = WsConn::connect_with_config(url.as_str(), config).await?;
    println!("Connected: {} -> {}", conn.local_addr(), conn.remote_addr());

    for line in ["hello", "over a", "byte stream"] {
        conn.write_all(line.as_bytes()).await?;

        conn.set_read_deadline(Some(Instant::now() + Duration::from_secs(5)));
        let mut reply = vec![0u8; line.len()];
        conn.read_exact(&mut reply).await?;
        println!("Echoed: {}", String::from_utf8_lossy(&reply));
    }

    conn.close().await?;
    println!("Closed");
    Ok(())
}
