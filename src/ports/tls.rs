use crate::domain::TtffError;
use super::io::BoxedIoStream;

pub struct TlsSession {
    pub stream: BoxedIoStream,
    pub version: String,
    pub alpn: Option<String>,
}

impl TlsSession {
    pub fn is_h2(&self) -> bool {
        self.alpn.as_deref() == Some("h2")
    }
}

pub trait TlsHandshaker: Send + Sync {
    fn handshake(&self, stream: BoxedIoStream, host: &str) -> impl std::future::Future<Output = Result<TlsSession, TtffError>> + Send;
}
