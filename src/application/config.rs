use std::time::Duration;
use crate::domain::{DelayPolicy, MeasurementKind, TransportKind, TtffError};
use super::ParsedUrl;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_DELAY: Duration = Duration::from_secs(5);
const DEFAULT_MAX_BODY: usize = 64 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct Config {
    pub url: String,
    /// Budget for one whole measurement pass, detection included.
    pub timeout: Duration,
    pub samples: usize,
    pub delay: DelayPolicy,
    pub exclude_outliers: bool,
    pub compare: bool,
    /// Transport used when not comparing.
    pub transport: TransportKind,
    pub kind: MeasurementKind,
    pub max_body: usize,
    pub json_output: bool,
}

impl Config {
    /// Defaults overridden by `TTFF_*` variables. A variable that is set but
    /// malformed is a configuration error, not a silent fallback.
    pub fn from_env(url: impl Into<String>) -> Result<Self, TtffError> {
        Self::from_lookup(url, |key| std::env::var(key).ok())
    }

    fn from_lookup(url: impl Into<String>, lookup: impl Fn(&str) -> Option<String>) -> Result<Self, TtffError> {
        let fixed = env_value(&lookup, "TTFF_DELAY", parse_duration)?.unwrap_or(DEFAULT_DELAY);
        let delay = match env_value(&lookup, "TTFF_DELAY_RANDOM", parse_delay_range)? {
            Some((min, max)) => DelayPolicy::random(min, max).map_err(|e| e.context("TTFF_DELAY_RANDOM"))?,
            None => DelayPolicy::Fixed(fixed),
        };

        Ok(Self {
            url: url.into(),
            timeout: env_value(&lookup, "TTFF_TIMEOUT", parse_duration)?.unwrap_or(DEFAULT_TIMEOUT),
            samples: env_value(&lookup, "TTFF_SAMPLES", parse_count)?.unwrap_or(1),
            delay,
            exclude_outliers: false,
            compare: false,
            transport: TransportKind::Stream,
            kind: MeasurementKind::Ttff,
            max_body: env_value(&lookup, "TTFF_MAX_BODY", parse_count)?.unwrap_or(DEFAULT_MAX_BODY),
            json_output: false,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_samples(mut self, samples: usize) -> Self {
        self.samples = samples;
        self
    }

    pub fn with_delay(mut self, delay: DelayPolicy) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_exclude_outliers(mut self, exclude: bool) -> Self {
        self.exclude_outliers = exclude;
        self
    }

    pub fn with_compare(mut self, compare: bool) -> Self {
        self.compare = compare;
        self
    }

    pub fn with_transport(mut self, transport: TransportKind) -> Self {
        self.transport = transport;
        self
    }

    pub fn with_kind(mut self, kind: MeasurementKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_json(mut self, json: bool) -> Self {
        self.json_output = json;
        self
    }

    /// Rejects anything that would only fail later, before a single request goes out.
    pub fn validate(self) -> Result<Self, TtffError> {
        if self.samples < 1 {
            return Err(TtffError::config("samples must be at least 1"));
        }
        if self.timeout.is_zero() {
            return Err(TtffError::config("timeout must be greater than zero"));
        }
        if let DelayPolicy::Random { min, max } = self.delay {
            if min > max {
                return Err(TtffError::config("min delay cannot be greater than max delay"));
            }
        }
        let url = ParsedUrl::parse(&self.url).map_err(|e| TtffError::config(e.message))?;
        let needs_quic = self.compare || self.transport == TransportKind::Multiplexed;
        if needs_quic && !url.is_https() {
            return Err(TtffError::config("HTTP/3 measurements require an https URL"));
        }
        Ok(self)
    }
}

/// Accepts `250ms`, `2s`, `1m`, `1500us` or bare seconds.
pub fn parse_duration(input: &str) -> Result<Duration, TtffError> {
    let v = input.trim();
    let parsed = if let Some(s) = v.strip_suffix("ms") {
        s.trim().parse::<u64>().ok().map(Duration::from_millis)
    } else if let Some(s) = v.strip_suffix("us") {
        s.trim().parse::<u64>().ok().map(Duration::from_micros)
    } else if let Some(s) = v.strip_suffix('s') {
        s.trim().parse::<f64>().ok().and_then(|f| Duration::try_from_secs_f64(f).ok())
    } else if let Some(s) = v.strip_suffix('m') {
        s.trim().parse::<u64>().ok().and_then(|m| m.checked_mul(60)).map(Duration::from_secs)
    } else {
        v.parse::<u64>().ok().map(Duration::from_secs)
    };
    parsed.ok_or_else(|| TtffError::config(format!("invalid duration '{}'", input)))
}

/// Parses `<min>-<max>`, e.g. `2s-8s`.
pub fn parse_delay_range(input: &str) -> Result<(Duration, Duration), TtffError> {
    let (min, max) = input.split_once('-')
        .ok_or_else(|| TtffError::config(format!("invalid delay range '{}', expected <min>-<max> (e.g. 2s-8s)", input)))?;
    let min = parse_duration(min).map_err(|e| e.context("invalid min delay"))?;
    let max = parse_duration(max).map_err(|e| e.context("invalid max delay"))?;
    if min > max {
        return Err(TtffError::config("min delay cannot be greater than max delay"));
    }
    Ok((min, max))
}

fn parse_count(input: &str) -> Result<usize, TtffError> {
    input.trim().parse().map_err(|_| TtffError::config(format!("invalid number '{}'", input)))
}

fn env_value<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    parse: impl Fn(&str) -> Result<T, TtffError>,
) -> Result<Option<T>, TtffError> {
    lookup(key).map(|v| parse(&v).map_err(|e| e.context(key))).transpose()
}
