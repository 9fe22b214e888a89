use std::time::Duration;
use rand::Rng;
use super::TtffError;

/// Wait applied between consecutive measurement passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelayPolicy {
    Fixed(Duration),
    /// Uniform over `[min, max]`, both ends inclusive.
    Random { min: Duration, max: Duration },
}

impl DelayPolicy {
    pub fn random(min: Duration, max: Duration) -> Result<Self, TtffError> {
        if min > max {
            return Err(TtffError::config(format!(
                "min delay ({:?}) cannot be greater than max delay ({:?})", min, max
            )));
        }
        Ok(DelayPolicy::Random { min, max })
    }

    /// A configured range always wins over the fixed delay.
    pub fn resolve(fixed: Duration, range: Option<(Duration, Duration)>) -> Result<Self, TtffError> {
        match range {
            Some((min, max)) => Self::random(min, max),
            None => Ok(DelayPolicy::Fixed(fixed)),
        }
    }

    pub fn next_delay<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        match *self {
            DelayPolicy::Fixed(d) => d,
            DelayPolicy::Random { min, max } => {
                let lo = nanos(min);
                let hi = nanos(max);
                Duration::from_nanos(rng.gen_range(lo..=hi))
            }
        }
    }
}

fn nanos(d: Duration) -> u64 {
    u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
}
