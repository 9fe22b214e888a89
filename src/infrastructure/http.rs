use std::io;
use std::pin::Pin;
use std::sync::{Arc, OnceLock};
use std::task::{Context, Poll};
use std::time::Instant;
use bytes::{Bytes, BytesMut};
use http_body_util::{BodyExt, Empty};
use hyper::body::Incoming;
use hyper::client::conn::{http1, http2};
use hyper_util::rt::{TokioExecutor, TokioIo};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::task::JoinHandle;
use tracing::debug;
use crate::application::ParsedUrl;
use crate::domain::TtffError;
use crate::ports::{HttpClient, HttpResponse, HttpVersion, BoxedIoStream};

pub const USER_AGENT: &str = concat!("ttff/", env!("CARGO_PKG_VERSION"));

/// HTTP/1.1 and HTTP/2 over a stream someone else connected. One request per
/// connection; the connection task is torn down once the body is read.
#[derive(Debug, Clone, Copy, Default)]
pub struct HyperHttpClient;

impl HyperHttpClient {
    pub fn new() -> Self { Self }
}

impl HttpClient for HyperHttpClient {
    async fn get(&self, stream: BoxedIoStream, version: HttpVersion, url: &ParsedUrl, max_body: usize) -> Result<HttpResponse, TtffError> {
        let (res, first_byte_at, _driver, label) = match version {
            HttpVersion::Http1 => {
                // the server says nothing before the request, so the first read is the response
                let first_read = Arc::new(OnceLock::new());
                let io = TokioIo::new(FirstRead { inner: stream, at: first_read.clone() });
                let (mut sender, conn) = http1::handshake(io).await
                    .map_err(|e| TtffError::http(format!("HTTP/1.1 handshake failed: {}", e)))?;
                let driver = DriverGuard(tokio::spawn(async move {
                    if let Err(e) = conn.await {
                        debug!(error = %e, "HTTP/1.1 connection closed with error");
                    }
                }));
                let req = build_request(&url.path_and_query, url)?;
                let res = sender.send_request(req).await
                    .map_err(|e| TtffError::http(format!("HTTP/1.1 request to {} failed: {}", url.full, e)))?;
                let head_at = Instant::now();
                (res, first_read.get().copied().unwrap_or(head_at), driver, "HTTP/1.1")
            }
            HttpVersion::Http2 => {
                let (mut sender, conn) = http2::handshake(TokioExecutor::new(), TokioIo::new(stream)).await
                    .map_err(|e| TtffError::http(format!("h2 handshake failed: {}", e)))?;
                let driver = DriverGuard(tokio::spawn(async move {
                    if let Err(e) = conn.await {
                        debug!(error = %e, "h2 connection closed with error");
                    }
                }));
                let uri = format!("{}://{}{}", url.scheme, url.authority(), url.path_and_query);
                let req = build_request(&uri, url)?;
                let res = sender.send_request(req).await
                    .map_err(|e| TtffError::http(format!("h2 request to {} failed: {}", url.full, e)))?;
                // settings frames share the wire, so h2 stamps the decoded head
                (res, Instant::now(), driver, "HTTP/2")
            }
        };

        let status = res.status().as_u16();
        let body = read_body(res.into_body(), max_body).await?;

        Ok(HttpResponse { status, version: label, first_byte_at: Some(first_byte_at), body })
    }
}

/// Aborts the connection task however the exchange ends, timeouts included.
struct DriverGuard(JoinHandle<()>);

impl Drop for DriverGuard {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Stamps the moment the first byte comes off the wire.
struct FirstRead {
    inner: BoxedIoStream,
    at: Arc<OnceLock<Instant>>,
}

impl AsyncRead for FirstRead {
    fn poll_read(mut self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &mut ReadBuf<'_>) -> Poll<io::Result<()>> {
        let before = buf.filled().len();
        let poll = Pin::new(&mut self.inner).poll_read(cx, buf);
        if buf.filled().len() > before {
            let _ = self.at.set(Instant::now());
        }
        poll
    }
}

impl AsyncWrite for FirstRead {
    fn poll_write(mut self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &[u8]) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.inner).poll_write(cx, buf)
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_flush(cx)
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_shutdown(cx)
    }

    fn poll_write_vectored(mut self: Pin<&mut Self>, cx: &mut Context<'_>, bufs: &[io::IoSlice<'_>]) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.inner).poll_write_vectored(cx, bufs)
    }

    fn is_write_vectored(&self) -> bool {
        self.inner.is_write_vectored()
    }
}

/// Origin-form target plus `Host` for HTTP/1.1; h2 carries the authority in
/// the absolute URI instead.
fn build_request(uri: &str, url: &ParsedUrl) -> Result<hyper::Request<Empty<Bytes>>, TtffError> {
    let mut builder = hyper::Request::builder().method("GET").uri(uri);
    if uri.starts_with('/') {
        builder = builder.header("host", url.authority());
    }
    builder
        .header("user-agent", USER_AGENT)
        .header("accept", "*/*")
        .body(Empty::<Bytes>::new())
        .map_err(|e| TtffError::http(format!("failed to build request for {}: {}", url.full, e)))
}

async fn read_body(mut body: Incoming, max_body: usize) -> Result<Bytes, TtffError> {
    let mut buf = BytesMut::new();
    while let Some(frame) = body.frame().await {
        let frame = frame.map_err(|e| TtffError::http(format!("failed to read body: {}", e)))?;
        if let Some(chunk) = frame.data_ref() {
            if buf.len() + chunk.len() > max_body {
                return Err(TtffError::http(format!("response body exceeds {} bytes", max_body)));
            }
            buf.extend_from_slice(chunk);
        }
    }
    Ok(buf.freeze())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorClass;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};

    async fn serve_once(mut server: DuplexStream, response: &'static [u8]) -> String {
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = server.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }
        server.write_all(response).await.unwrap();
        server.shutdown().await.unwrap();
        String::from_utf8(request).unwrap()
    }

    fn url(s: &str) -> ParsedUrl {
        ParsedUrl::parse(s).unwrap()
    }

    #[tokio::test]
    async fn test_http1_get_reads_whole_body() {
        let (client, server) = tokio::io::duplex(64 * 1024);
        let server = tokio::spawn(serve_once(server, b"HTTP/1.1 200 OK\r\nContent-Length: 8\r\nContent-Type: application/vnd.apple.mpegurl\r\n\r\n#EXTM3U\n"));

        let started = Instant::now();
        let res = HyperHttpClient::new()
            .get(Box::new(client), HttpVersion::Http1, &url("http://cdn.example.com:8080/live/index.m3u8?t=1"), 1024)
            .await
            .unwrap();

        assert_eq!(res.status, 200);
        assert_eq!(res.version, "HTTP/1.1");
        assert_eq!(&res.body[..], b"#EXTM3U\n");
        assert!(res.first_byte_at.unwrap() >= started);

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /live/index.m3u8?t=1 HTTP/1.1\r\n"));
        assert!(request.to_ascii_lowercase().contains("host: cdn.example.com:8080\r\n"));
    }

    #[tokio::test]
    async fn test_http1_first_byte_is_first_read_not_full_head() {
        let (client, mut server) = tokio::io::duplex(64 * 1024);
        tokio::spawn(async move {
            let mut buf = [0u8; 1024];
            let _ = server.read(&mut buf).await;
            server.write_all(b"HTTP/1.1 200 OK\r\n").await.unwrap();
            tokio::time::sleep(Duration::from_millis(300)).await;
            server.write_all(b"Content-Length: 2\r\n\r\nok").await.unwrap();
        });

        let started = Instant::now();
        let res = HyperHttpClient::new()
            .get(Box::new(client), HttpVersion::Http1, &url("http://cdn.example.com/slow"), 1024)
            .await
            .unwrap();

        assert!(started.elapsed() >= Duration::from_millis(300));
        assert!(res.first_byte_at.unwrap() - started < Duration::from_millis(200));
    }

    #[tokio::test]
    async fn test_abandoned_exchange_releases_connection() {
        let (client, mut server) = tokio::io::duplex(64 * 1024);
        let peer = tokio::spawn(async move {
            let mut buf = [0u8; 1024];
            let _ = server.read(&mut buf).await;
            // no response; wait for the client side to go away
            loop {
                match server.read(&mut buf).await {
                    Ok(0) | Err(_) => return,
                    Ok(_) => {}
                }
            }
        });

        let http = HyperHttpClient::new();
        let target = url("http://cdn.example.com/hang");
        let exchange = http.get(Box::new(client), HttpVersion::Http1, &target, 1024);
        assert!(tokio::time::timeout(Duration::from_millis(50), exchange).await.is_err());

        tokio::time::timeout(Duration::from_secs(2), peer).await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_http1_chunked_body() {
        let (client, server) = tokio::io::duplex(64 * 1024);
        tokio::spawn(serve_once(server, b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n4\r\nseg0\r\n3\r\n.ts\r\n0\r\n\r\n"));

        let res = HyperHttpClient::new()
            .get(Box::new(client), HttpVersion::Http1, &url("http://cdn.example.com/a"), 1024)
            .await
            .unwrap();

        assert_eq!(&res.body[..], b"seg0.ts");
    }

    #[tokio::test]
    async fn test_error_status_is_returned_not_raised() {
        let (client, server) = tokio::io::duplex(64 * 1024);
        tokio::spawn(serve_once(server, b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\n\r\n"));

        let res = HyperHttpClient::new()
            .get(Box::new(client), HttpVersion::Http1, &url("http://cdn.example.com/missing"), 1024)
            .await
            .unwrap();

        assert_eq!(res.status, 404);
        assert!(!res.is_success());
    }

    #[tokio::test]
    async fn test_body_over_limit_is_http_error() {
        let (client, server) = tokio::io::duplex(64 * 1024);
        tokio::spawn(serve_once(server, b"HTTP/1.1 200 OK\r\nContent-Length: 16\r\n\r\n0123456789abcdef"));

        let err = HyperHttpClient::new()
            .get(Box::new(client), HttpVersion::Http1, &url("http://cdn.example.com/big.ts"), 8)
            .await
            .unwrap_err();

        assert_eq!(err.class, ErrorClass::Http);
        assert!(err.message.contains("exceeds 8 bytes"));
    }

    #[tokio::test]
    async fn test_garbage_response_is_http_error() {
        let (client, server) = tokio::io::duplex(64 * 1024);
        tokio::spawn(serve_once(server, b"SSH-2.0-OpenSSH_9.6\r\n\r\n"));

        let err = HyperHttpClient::new()
            .get(Box::new(client), HttpVersion::Http1, &url("http://cdn.example.com/"), 1024)
            .await
            .unwrap_err();

        assert_eq!(err.class, ErrorClass::Http);
    }
}
