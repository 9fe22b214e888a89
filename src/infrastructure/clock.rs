use std::time::{Duration, Instant};
use crate::domain::TtffError;
use crate::ports::Clock;

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

impl TokioClock {
    pub fn new() -> Self { Self }
}

impl Clock for TokioClock {
    fn now(&self) -> Instant { Instant::now() }

    async fn timeout<F, T>(&self, duration: Duration, future: F) -> Result<T, TtffError>
    where
        F: std::future::Future<Output = T> + Send,
        T: Send,
    {
        tokio::time::timeout(duration, future).await.map_err(|_| TtffError::timeout(format!("operation timed out after {:?}", duration)))
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorClass;

    #[tokio::test]
    async fn test_timeout_maps_to_timeout_class() {
        let err = TokioClock::new()
            .timeout(Duration::from_millis(10), std::future::pending::<()>())
            .await
            .unwrap_err();
        assert_eq!(err.class, ErrorClass::Timeout);
    }

    #[tokio::test]
    async fn test_completed_future_passes_through() {
        let value = TokioClock::new().timeout(Duration::from_secs(1), async { 42 }).await.unwrap();
        assert_eq!(value, 42);
    }
}
