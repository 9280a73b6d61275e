use std::io;
use std::path::Path;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::audio::alert::{ALERT_FILE, BELL_FILE};

/// The browser page that draws readouts and plays cues.
pub const INDEX_HTML: &str = include_str!("index.html");

pub const SOCKET_PATH: &str = "/ws";

const MAX_HEAD_BYTES: usize = 8 * 1024;
const PEEK_ATTEMPTS: usize = 50;
const PEEK_RETRY: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Socket,
    Page,
    Clip(&'static str),
    NotFound(String),
    BadRequest,
}

/// Maps the target of a request line to what answers it.
pub fn route(request_line: &str) -> Route {
    let mut parts = request_line.split_whitespace();
    let (Some(method), Some(target)) = (parts.next(), parts.next()) else {
        return Route::BadRequest;
    };
    if method != "GET" {
        return Route::BadRequest;
    }

    let path = target.split(['?', '#']).next().unwrap_or(target);
    match path {
        SOCKET_PATH => Route::Socket,
        "/" | "/index.html" => Route::Page,
        _ => [ALERT_FILE, BELL_FILE]
            .into_iter()
            .find(|file| path.strip_prefix('/') == Some(*file))
            .map(Route::Clip)
            .unwrap_or_else(|| Route::NotFound(path.to_string())),
    }
}

/// Reads the request line without consuming it, so a WebSocket upgrade can
/// still see the whole handshake.
pub async fn peek_route(stream: &TcpStream) -> io::Result<Route> {
    let mut buf = vec![0u8; MAX_HEAD_BYTES];
    for _ in 0..PEEK_ATTEMPTS {
        let n = stream.peek(&mut buf).await?;
        if n == 0 {
            return Ok(Route::BadRequest);
        }
        if let Some(end) = buf[..n].iter().position(|b| *b == b'\n') {
            return Ok(route(&String::from_utf8_lossy(&buf[..end])));
        }
        if n == buf.len() {
            break;
        }
        tokio::time::sleep(PEEK_RETRY).await;
    }
    Ok(Route::BadRequest)
}

/// Consumes the request head so closing the socket does not reset it.
async fn drain_head(stream: &mut TcpStream) -> io::Result<()> {
    let mut head = Vec::new();
    let mut chunk = [0u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") && head.len() < MAX_HEAD_BYTES {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        head.extend_from_slice(&chunk[..n]);
    }
    Ok(())
}

fn response(status: &str, content_type: &str, body: &[u8]) -> Vec<u8> {
    let mut out = format!(
        "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nCache-Control: no-cache\r\nConnection: close\r\n\r\n",
        status,
        content_type,
        body.len()
    )
    .into_bytes();
    out.extend_from_slice(body);
    out
}

/// Answers a plain HTTP request: the page, a clip from `assets_dir`, or an
/// error status.
pub async fn respond(mut stream: TcpStream, route: Route, assets_dir: &Path) -> io::Result<()> {
    drain_head(&mut stream).await?;

    let reply = match route {
        Route::Page => response("200 OK", "text/html; charset=utf-8", INDEX_HTML.as_bytes()),
        Route::Clip(file) => match tokio::fs::read(assets_dir.join(file)).await {
            Ok(bytes) => response("200 OK", "audio/mpeg", &bytes),
            Err(e) => {
                tracing::debug!(file, "Clip unavailable: {}", e);
                response("404 Not Found", "text/plain", b"clip not found")
            }
        },
        Route::NotFound(_) => response("404 Not Found", "text/plain", b"not found"),
        Route::BadRequest | Route::Socket => {
            response("400 Bad Request", "text/plain", b"bad request")
        }
    };

    stream.write_all(&reply).await?;
    stream.shutdown().await
}
