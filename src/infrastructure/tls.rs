use std::sync::Arc;
use tokio_rustls::TlsConnector;
use rustls::ClientConfig;
use rustls::pki_types::ServerName;
use crate::domain::TtffError;
use crate::ports::{TlsHandshaker, TlsSession, BoxedIoStream};

pub struct RustlsTlsHandshaker {
    connector: TlsConnector,
}

impl RustlsTlsHandshaker {
    pub fn new() -> Self {
        let root_store = rustls::RootCertStore::from_iter(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
        let mut config = ClientConfig::builder().with_root_certificates(root_store).with_no_client_auth();
        config.alpn_protocols = vec![b"h2".to_vec(), b"http/1.1".to_vec()];
        Self { connector: TlsConnector::from(Arc::new(config)) }
    }
}

impl Default for RustlsTlsHandshaker {
    fn default() -> Self {
        Self::new()
    }
}

impl TlsHandshaker for RustlsTlsHandshaker {
    async fn handshake(&self, stream: BoxedIoStream, host: &str) -> Result<TlsSession, TtffError> {
        let host = host.trim_start_matches('[').trim_end_matches(']');
        let server_name = ServerName::try_from(host.to_string())
            .map_err(|_| TtffError::tls(format!("invalid server name: {}", host)))?;

        let tls_stream = self.connector.connect(server_name, stream).await
            .map_err(|e| TtffError::tls(format!("TLS handshake with {} failed: {}", host, e)))?;

        let (_, conn) = tls_stream.get_ref();
        let version = match conn.protocol_version() {
            Some(rustls::ProtocolVersion::TLSv1_2) => "TLS1.2".to_string(),
            Some(rustls::ProtocolVersion::TLSv1_3) => "TLS1.3".to_string(),
            Some(v) => format!("{:?}", v),
            None => "unknown".to_string(),
        };
        let alpn = conn.alpn_protocol().map(|p| String::from_utf8_lossy(p).to_string());

        Ok(TlsSession { stream: Box::new(tls_stream), version, alpn })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorClass;

    fn install_provider() {
        let _ = rustls::crypto::ring::default_provider().install_default();
    }

    #[tokio::test]
    async fn test_non_tls_peer_fails_as_tls_error() {
        install_provider();
        let (client, mut server) = tokio::io::duplex(4096);
        tokio::spawn(async move {
            use tokio::io::{AsyncReadExt, AsyncWriteExt};
            let mut buf = [0u8; 512];
            let _ = server.read(&mut buf).await;
            let _ = server.write_all(b"HTTP/1.1 400 Bad Request\r\n\r\n").await;
        });

        let Err(err) = RustlsTlsHandshaker::new().handshake(Box::new(client), "cdn.example.com").await else {
            panic!("handshake with a plain-text peer succeeded");
        };
        assert_eq!(err.class, ErrorClass::Tls);
    }
}
