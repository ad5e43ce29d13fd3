//! Shared helpers for integration tests.
//!
//! A deliberately dumb HTTP/1.1 client over a raw TCP stream: one request,
//! `connection: close`, read to EOF. Keeps the tests independent of any
//! client library's connection handling.

use std::net::SocketAddr;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

pub struct Reply {
    pub status: u16,
    pub body: String,
}

pub async fn get(addr: SocketAddr, path: &str) -> Reply {
    request(addr, "GET", path).await
}

pub async fn request(addr: SocketAddr, method: &str, path: &str) -> Reply {
    let mut stream = TcpStream::connect(addr).await.expect("connect failed");
    let raw = format!("{method} {path} HTTP/1.1\r\nhost: {addr}\r\nconnection: close\r\n\r\n");
    stream.write_all(raw.as_bytes()).await.expect("write failed");

    let mut buf = Vec::new();
    stream.read_to_end(&mut buf).await.expect("read failed");
    let text = String::from_utf8_lossy(&buf).into_owned();

    let status = text
        .split_whitespace()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .expect("malformed status line");
    let body = text
        .split_once("\r\n\r\n")
        .map(|(_, b)| b.to_owned())
        .unwrap_or_default();

    Reply { status, body }
}
