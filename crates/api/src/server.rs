// ABOUTME: Minimal HTTP/1.1 listener that feeds requests to PodcastService.
// ABOUTME: One task per connection; reads a bounded request head and answers with Connection: close.

use std::future::Future;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};

use crate::service::{ApiRequest, ApiResponse, PodcastService};

/// Upper bound for the request line plus headers.
pub const MAX_HEAD_BYTES: u64 = 16 * 1024;
const READ_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug)]
enum HeadError {
    /// The peer closed the connection before sending anything.
    Closed,
    Malformed(&'static str),
    Io(io::Error),
}

impl From<io::Error> for HeadError {
    fn from(err: io::Error) -> Self {
        HeadError::Io(err)
    }
}

/// Serves until the process exits.
pub async fn serve(listener: TcpListener, service: Arc<PodcastService>) -> io::Result<()> {
    serve_with_shutdown(listener, service, std::future::pending()).await
}

/// Serves until `shutdown` resolves. In-flight connections finish on their own tasks.
pub async fn serve_with_shutdown<F>(
    listener: TcpListener,
    service: Arc<PodcastService>,
    shutdown: F,
) -> io::Result<()>
where
    F: Future<Output = ()>,
{
    let addr = listener.local_addr()?;
    info!(%addr, "podcast API listening");
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("shutting down listener");
                return Ok(());
            }
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    let service = Arc::clone(&service);
                    tokio::spawn(async move {
                        if let Err(err) = handle_connection(stream, &service).await {
                            debug!(%peer, error = %err, "connection failed");
                        }
                    });
                }
                Err(err) => {
                    warn!(error = %err, "accept failed");
                    tokio::time::sleep(Duration::from_millis(100)).await;
                }
            }
        }
    }
}

async fn handle_connection(mut stream: TcpStream, service: &PodcastService) -> io::Result<()> {
    let (read_half, mut write_half) = stream.split();
    let mut reader = BufReader::new(read_half).take(MAX_HEAD_BYTES);

    let head = tokio::time::timeout(READ_TIMEOUT, read_request_head(&mut reader))
        .await
        .unwrap_or(Err(HeadError::Malformed("timed out reading request head")));

    let response = match head {
        Ok(request) => service.handle(&request).await,
        Err(HeadError::Closed) => return Ok(()),
        Err(HeadError::Io(err)) => return Err(err),
        Err(HeadError::Malformed(reason)) => {
            debug!(reason, "malformed request");
            service.bad_request()
        }
    };

    write_response(&mut write_half, &response).await
}

async fn read_request_head<R>(reader: &mut R) -> Result<ApiRequest, HeadError>
where
    R: AsyncBufRead + Unpin,
{
    let mut request_line = String::new();
    if reader.read_line(&mut request_line).await? == 0 {
        return Err(HeadError::Closed);
    }
    if !request_line.ends_with('\n') {
        return Err(HeadError::Malformed("request head too large"));
    }

    let mut parts = request_line.split_whitespace();
    let (Some(method), Some(target), Some(version), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(HeadError::Malformed("bad request line"));
    };
    if !version.starts_with("HTTP/1.") || !target.starts_with('/') {
        return Err(HeadError::Malformed("bad request line"));
    }

    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).await? == 0 || !line.ends_with('\n') {
            return Err(HeadError::Malformed("truncated headers"));
        }
        if line == "\r\n" || line == "\n" {
            break;
        }
        if !line.contains(':') {
            return Err(HeadError::Malformed("bad header line"));
        }
    }

    Ok(ApiRequest::new(method, target))
}

async fn write_response<W>(writer: &mut W, response: &ApiResponse) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut head = format!(
        "HTTP/1.1 {} {}\r\n",
        response.status,
        reason_phrase(response.status)
    );
    for (name, value) in &response.headers {
        head.push_str(&format!("{name}: {value}\r\n"));
    }
    head.push_str(&format!(
        "Content-Length: {}\r\nConnection: close\r\n\r\n",
        response.body.len()
    ));

    writer.write_all(head.as_bytes()).await?;
    writer.write_all(response.body.as_bytes()).await?;
    writer.flush().await?;
    writer.shutdown().await
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        405 => "Method Not Allowed",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}
