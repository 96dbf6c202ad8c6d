//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// What a mock backend does with one request.
#[allow(dead_code)]
pub enum MockResponse {
    /// Answer with this status and JSON body.
    Respond(u16, String),
    /// Accept the connection but never answer (forces a client timeout).
    Hang,
}

/// Bind an ephemeral port, then free it again. Connections to the returned
/// address are refused, which makes a fast, deterministic "down" candidate.
#[allow(dead_code)]
pub async fn reserve_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// Start a mock backend that routes on (method, path). Returns the bound
/// address. The handler runs for every request; tests count hits through
/// captured atomics.
pub async fn start_routed_backend<F>(handler: F) -> SocketAddr
where
    F: Fn(&str, &str) -> MockResponse + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handler = Arc::new(handler);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let handler = handler.clone();
                    tokio::spawn(async move {
                        let mut buf = vec![0u8; 4096];
                        let mut head = Vec::new();
                        let header_end = loop {
                            match socket.read(&mut buf).await {
                                Ok(0) => return,
                                Ok(n) => {
                                    head.extend_from_slice(&buf[..n]);
                                    if let Some(pos) =
                                        head.windows(4).position(|w| w == b"\r\n\r\n")
                                    {
                                        break pos + 4;
                                    }
                                    if head.len() > 64 * 1024 {
                                        return;
                                    }
                                }
                                Err(_) => return,
                            }
                        };

                        let text = String::from_utf8_lossy(&head[..header_end]).into_owned();

                        // Drain the request body so the client never sees a
                        // reset while still writing it.
                        let content_length = text
                            .lines()
                            .find_map(|line| {
                                let (name, value) = line.split_once(':')?;
                                name.eq_ignore_ascii_case("content-length")
                                    .then(|| value.trim().parse::<usize>().ok())?
                            })
                            .unwrap_or(0);
                        let mut remaining =
                            content_length.saturating_sub(head.len() - header_end);
                        while remaining > 0 {
                            match socket.read(&mut buf).await {
                                Ok(0) | Err(_) => break,
                                Ok(n) => remaining = remaining.saturating_sub(n),
                            }
                        }

                        let mut parts = text.split_whitespace();
                        let method = parts.next().unwrap_or("").to_string();
                        let path = parts.next().unwrap_or("").to_string();

                        match handler(&method, &path) {
                            MockResponse::Respond(status, body) => {
                                let response = format!(
                                    "HTTP/1.1 {} MOCK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                                    status,
                                    body.len(),
                                    body
                                );
                                let _ = socket.write_all(response.as_bytes()).await;
                                let _ = socket.shutdown().await;
                            }
                            MockResponse::Hang => {
                                tokio::time::sleep(Duration::from_secs(3600)).await;
                            }
                        }
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Start a backend that answers every path with the same status and body.
#[allow(dead_code)]
pub async fn start_fixed_backend(status: u16, body: &'static str) -> SocketAddr {
    start_routed_backend(move |_, _| MockResponse::Respond(status, body.to_string())).await
}

/// Base URL string for a mock backend address.
#[allow(dead_code)]
pub fn base_url(addr: SocketAddr) -> String {
    format!("http://{}", addr)
}
