use std::time::Duration;
use bytes::Bytes;
use crate::domain::{Trace, TransportKind, TtffError};

/// A completed, successful (2xx) fetch and its phase trace.
#[derive(Debug, Clone)]
pub struct Fetched {
    pub url: String,
    pub protocol: &'static str,
    pub body: Bytes,
    pub trace: Trace,
}

/// Performs exactly one traced GET bounded by `timeout`.
pub trait Fetcher: Send + Sync {
    fn transport(&self) -> TransportKind;

    fn fetch(&self, url: &str, timeout: Duration) -> impl std::future::Future<Output = Result<Fetched, TtffError>> + Send;
}
