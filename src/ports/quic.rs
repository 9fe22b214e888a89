use std::net::SocketAddr;
use crate::application::ParsedUrl;
use crate::domain::TtffError;
use super::http::HttpResponse;

/// An established QUIC connection that carries exactly one HTTP/3 request.
pub trait QuicConnection: Send {
    fn get(self, url: &ParsedUrl, max_body: usize) -> impl std::future::Future<Output = Result<HttpResponse, TtffError>> + Send;
}

/// Connect and crypto handshake happen together; the returned connection is ready.
pub trait QuicDialer: Send + Sync {
    type Connection: QuicConnection;

    fn connect(&self, addr: SocketAddr, host: &str) -> impl std::future::Future<Output = Result<Self::Connection, TtffError>> + Send;
}
