use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use bytes::{Buf, BufMut, Bytes, BytesMut};
use quinn::crypto::rustls::QuicClientConfig;
use quinn::{ConnectError, Endpoint};
use tracing::debug;
use crate::application::ParsedUrl;
use crate::domain::TtffError;
use crate::ports::{HttpResponse, QuicConnection, QuicDialer};
use super::http::USER_AGENT;

pub struct QuinnDialer {
    client_config: quinn::ClientConfig,
}

impl QuinnDialer {
    pub fn new() -> Result<Self, TtffError> {
        let root_store = rustls::RootCertStore::from_iter(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
        let mut tls = rustls::ClientConfig::builder().with_root_certificates(root_store).with_no_client_auth();
        tls.alpn_protocols = vec![b"h3".to_vec()];
        let crypto = QuicClientConfig::try_from(tls)
            .map_err(|e| TtffError::tls(format!("TLS config unusable for QUIC: {}", e)))?;
        Ok(Self { client_config: quinn::ClientConfig::new(Arc::new(crypto)) })
    }
}

impl QuicDialer for QuinnDialer {
    type Connection = QuinnConnection;

    async fn connect(&self, addr: SocketAddr, host: &str) -> Result<QuinnConnection, TtffError> {
        let bind: SocketAddr = if addr.is_ipv6() { "[::]:0" } else { "0.0.0.0:0" }
            .parse()
            .map_err(|_| TtffError::other("invalid local bind address"))?;

        let mut endpoint = Endpoint::client(bind)
            .map_err(|e| TtffError::tcp(format!("failed to open UDP socket: {}", e)))?;
        endpoint.set_default_client_config(self.client_config.clone());

        let host = host.trim_start_matches('[').trim_end_matches(']');
        let connecting = endpoint.connect(addr, host).map_err(|e| match e {
            ConnectError::InvalidServerName(name) => TtffError::tls(format!("invalid server name: {}", name)),
            other => TtffError::tcp(format!("QUIC connect to {} failed: {}", addr, other)),
        })?;
        let conn = connecting.await
            .map_err(|e| TtffError::tls(format!("QUIC handshake with {} failed: {}", addr, e)))?;

        debug!(peer = %addr, "QUIC connection established");
        Ok(QuinnConnection { endpoint, conn })
    }
}

/// Owns its endpoint so the UDP socket lives exactly as long as the request.
pub struct QuinnConnection {
    endpoint: Endpoint,
    conn: quinn::Connection,
}

impl QuicConnection for QuinnConnection {
    async fn get(self, url: &ParsedUrl, max_body: usize) -> Result<HttpResponse, TtffError> {
        let (mut driver, mut sender) = h3::client::new(h3_quinn::Connection::new(self.conn.clone())).await
            .map_err(|e| TtffError::http(format!("h3 setup failed: {}", e)))?;
        let drive = tokio::spawn(async move {
            if let Err(e) = std::future::poll_fn(|cx| driver.poll_close(cx)).await {
                debug!(error = %e, "h3 connection closed with error");
            }
        });

        let result = exchange(&mut sender, url, max_body).await;

        drop(sender);
        drive.abort();
        self.conn.close(0u32.into(), b"done");
        self.endpoint.close(0u32.into(), b"done");
        result
    }
}

async fn exchange(
    sender: &mut h3::client::SendRequest<h3_quinn::OpenStreams, Bytes>,
    url: &ParsedUrl,
    max_body: usize,
) -> Result<HttpResponse, TtffError> {
    let req = http::Request::get(url.full.as_str())
        .header("user-agent", USER_AGENT)
        .header("accept", "*/*")
        .body(())
        .map_err(|e| TtffError::http(format!("failed to build request for {}: {}", url.full, e)))?;

    let mut stream = sender.send_request(req).await
        .map_err(|e| TtffError::http(format!("h3 request to {} failed: {}", url.full, e)))?;
    stream.finish().await
        .map_err(|e| TtffError::http(format!("h3 request to {} failed: {}", url.full, e)))?;

    let res = stream.recv_response().await
        .map_err(|e| TtffError::http(format!("h3 response from {} failed: {}", url.full, e)))?;
    let first_byte_at = Instant::now();
    let status = res.status().as_u16();

    let mut body = BytesMut::new();
    while let Some(chunk) = stream.recv_data().await
        .map_err(|e| TtffError::http(format!("failed to read body: {}", e)))?
    {
        if body.len() + chunk.remaining() > max_body {
            return Err(TtffError::http(format!("response body exceeds {} bytes", max_body)));
        }
        body.put(chunk);
    }

    Ok(HttpResponse { status, version: "HTTP/3", first_byte_at: Some(first_byte_at), body: body.freeze() })
}
