//! Test harness utilities for WebSocket byte stream testing.
//!
//! This module provides throwaway servers on random local ports: a WebSocket
//! echo server, a TCP server that never answers, and a plain HTTP server that
//! refuses the upgrade.

mod server;

#[allow(unused_imports)]
pub use server::{PlainHttpServer, SilentServer, TestServer};

#[allow(dead_code)]
pub fn ws_url(addr: std::net::SocketAddr) -> String {
    format!("ws://{addr}/")
}
