use std::time::Instant;
use bytes::Bytes;
use crate::application::ParsedUrl;
use crate::domain::TtffError;
use super::io::BoxedIoStream;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpVersion {
    Http1,
    Http2,
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub version: &'static str,
    /// First response byte off the wire where the client can see it (HTTP/1.1);
    /// otherwise when the decoded head arrived. `None` if neither is known.
    pub first_byte_at: Option<Instant>,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends one GET over an already-established stream and reads the whole body,
/// failing once it grows past `max_body` bytes.
pub trait HttpClient: Send + Sync {
    fn get(&self, stream: BoxedIoStream, version: HttpVersion, url: &ParsedUrl, max_body: usize)
        -> impl std::future::Future<Output = Result<HttpResponse, TtffError>> + Send;
}
