use std::time::Duration;
use bytes::Bytes;
use crate::domain::TtffError;

/// Confirms a segment contains a decodable video frame.
pub trait FrameDetector: Send + Sync {
    /// Fails fast when the detector cannot run at all.
    fn check(&self) -> Result<(), TtffError>;

    /// Elapsed time until a frame was confirmed, bounded by `deadline`.
    fn detect(&self, segment: Bytes, deadline: Duration) -> impl std::future::Future<Output = Result<Duration, TtffError>> + Send;
}
