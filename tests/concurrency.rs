//! Concurrency tests for WebSocket byte streams.
//!
//! Tests ordering and isolation with many connections and with split halves.

mod harness;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use harness::{TestServer, ws_url};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::sync::Barrier;
use tokio::task::JoinSet;
use wsconn::WsConn;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_multiple_clients_sequential() {
    let (server, addr) = TestServer::spawn().await;

    for i in 0..10 {
        let mut conn = WsConn::connect(ws_url(addr)).await.unwrap();
        let msg = format!("hello from client {}", i);
        conn.write_all(msg.as_bytes()).await.unwrap();

        let mut buf = vec![0u8; msg.len()];
        conn.read_exact(&mut buf).await.unwrap();
        assert_eq!(buf, msg.as_bytes());
        conn.close().await.unwrap();
    }

    server.shutdown().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_barrier_synchronized_clients() {
    const NUM_CLIENTS: usize = 30;
    const MESSAGES_PER_CLIENT: usize = 10;

    let (server, addr) = TestServer::spawn().await;
    let barrier = Arc::new(Barrier::new(NUM_CLIENTS));
    let received = Arc::new(AtomicUsize::new(0));

    let mut set = JoinSet::new();

    for client_id in 0..NUM_CLIENTS {
        let barrier = barrier.clone();
        let received = received.clone();

        set.spawn(async move {
            let mut conn = WsConn::connect(ws_url(addr)).await.unwrap();
            barrier.wait().await;

            for seq in 0..MESSAGES_PER_CLIENT {
                let msg = format!("client:{}:msg:{}", client_id, seq);
                conn.write_all(msg.as_bytes()).await.unwrap();

                let mut buf = vec![0u8; msg.len()];
                conn.read_exact(&mut buf).await.unwrap();
                assert_eq!(buf, msg.as_bytes());
                received.fetch_add(1, Ordering::Relaxed);
            }

            conn.close().await.unwrap();
        });
    }

    while let Some(result) = set.join_next().await {
        result.unwrap();
    }

    assert_eq!(
        received.load(Ordering::Relaxed),
        NUM_CLIENTS * MESSAGES_PER_CLIENT
    );
    server.shutdown().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_split_halves_read_and_write_concurrently() {
    const MESSAGES: usize = 200;

    let (server, addr) = TestServer::spawn().await;
    let conn = WsConn::connect(ws_url(addr)).await.unwrap();
    let (mut reader, mut writer) = tokio::io::split(conn);

    let expected: Vec<u8> = (0..MESSAGES)
        .flat_map(|seq| format!("[{seq:04}]").into_bytes())
        .collect();
    let total = expected.len();

    let write_task = tokio::spawn(async move {
        for seq in 0..MESSAGES {
            writer
                .write_all(format!("[{seq:04}]").as_bytes())
                .await
                .unwrap();
        }
        writer.flush().await.unwrap();
        writer
    });

    let read_task = tokio::spawn(async move {
        let mut out = vec![0u8; total];
        reader.read_exact(&mut out).await.unwrap();
        (reader, out)
    });

    let writer = write_task.await.unwrap();
    let (reader, out) = read_task.await.unwrap();
    assert_eq!(out, expected);

    let mut conn = reader.unsplit(writer);
    conn.close().await.unwrap();
    server.shutdown().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_close_signal_observed_from_other_task() {
    let (server, addr) = TestServer::spawn().await;
    let mut conn = WsConn::connect(ws_url(addr)).await.unwrap();

    let observers: Vec<_> = (0..5)
        .map(|_| {
            let signal = conn.close_signal();
            tokio::spawn(async move { signal.cancelled().await })
        })
        .collect();

    conn.close().await.unwrap();
    for observer in observers {
        observer.await.unwrap();
    }

    server.shutdown().await;
}
