//! Minimal HTTP trigger for scheduled refreshes (Cloud Scheduler, cron + curl).
//!
//! `GET` or `POST` on `/` or `/refresh` runs one refresh and answers
//! `200 Done!` or `500 Failed`. Connections are handled one at a time, so a
//! single server never runs two refreshes against the same document at once.

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use crate::error::SchwabError;
use crate::oauth::TokenRefresher;

pub const SUCCESS_MARKER: &str = "Done!";
pub const FAILURE_MARKER: &str = "Failed";

/// How long a client gets to send its request line before it is dropped.
pub const READ_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    Refresh,
    NotFound,
    MethodNotAllowed,
}

/// Serve refresh triggers until the listener fails.
pub async fn serve(listener: TcpListener, refresher: &TokenRefresher) -> Result<(), SchwabError> {
    serve_with_timeout(listener, refresher, READ_TIMEOUT).await
}

/// Like [`serve`], with a custom per-connection read deadline.
pub async fn serve_with_timeout(
    listener: TcpListener,
    refresher: &TokenRefresher,
    read_timeout: Duration,
) -> Result<(), SchwabError> {
    tracing::info!("Listening for refresh triggers on {}", listener.local_addr()?);
    loop {
        let (stream, peer) = listener.accept().await?;
        tracing::debug!("Trigger connection from {peer}");
        if let Err(e) = handle_connection(stream, refresher, read_timeout).await {
            tracing::warn!("Trigger connection from {peer} failed: {e}");
        }
    }
}

async fn handle_connection(
    mut stream: TcpStream,
    refresher: &TokenRefresher,
    read_timeout: Duration,
) -> Result<(), SchwabError> {
    let mut buf = vec![0u8; 4096];
    let n = tokio::time::timeout(read_timeout, stream.read(&mut buf))
        .await
        .map_err(|_| {
            std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                format!("no request within {}s", read_timeout.as_secs_f32()),
            )
        })??;
    let request = String::from_utf8_lossy(&buf[..n]);

    let (status, body) = match route(&request) {
        Route::Refresh => match refresher.refresh().await {
            Ok(_) => ("200 OK", SUCCESS_MARKER),
            Err(e) => {
                tracing::error!(code = e.code(), "Refresh trigger failed: {e}");
                ("500 Internal Server Error", FAILURE_MARKER)
            }
        },
        Route::NotFound => ("404 Not Found", "Not Found"),
        Route::MethodNotAllowed => ("405 Method Not Allowed", "Method Not Allowed"),
    };

    let response = format!(
        "HTTP/1.1 {status}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await?;
    Ok(())
}

fn route(request: &str) -> Route {
    let mut parts = request
        .lines()
        .next()
        .unwrap_or_default()
        .split_whitespace();
    let (Some(method), Some(target)) = (parts.next(), parts.next()) else {
        return Route::NotFound;
    };
    let path = target.split('?').next().unwrap_or_default();

    match path {
        "/" | "/refresh" => match method {
            "GET" | "POST" => Route::Refresh,
            _ => Route::MethodNotAllowed,
        },
        _ => Route::NotFound,
    }
}
