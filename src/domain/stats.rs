//! Summary statistics and IQR outlier detection over elapsed-time samples.
//!
//! Everything here is a pure function of its input slice. Sorting always
//! happens on a private copy so callers keep their temporal order, which
//! outlier indices refer to.

use std::borrow::Cow;
use std::collections::HashSet;
use std::time::Duration;
use serde::Serialize;

const IQR_FENCE: f64 = 1.5;
const MIN_OUTLIER_SAMPLES: usize = 4;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    #[serde(rename = "mean_ms", serialize_with = "super::millis::serialize")]
    pub mean: Duration,
    #[serde(rename = "median_ms", serialize_with = "super::millis::serialize")]
    pub median: Duration,
    #[serde(rename = "min_ms", serialize_with = "super::millis::serialize")]
    pub min: Duration,
    #[serde(rename = "max_ms", serialize_with = "super::millis::serialize")]
    pub max: Duration,
    #[serde(rename = "std_dev_ms", serialize_with = "super::millis::serialize")]
    pub std_dev: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Outlier {
    /// Position in the input sequence (temporal order), zero-based.
    pub index: usize,
    #[serde(rename = "value_ms", serialize_with = "super::millis::serialize")]
    pub value: Duration,
    /// Signed deviation from the input mean, in percent.
    pub deviation_pct: f64,
}

/// Empty input yields all-zero stats ("no observations").
pub fn compute_stats(values: &[Duration]) -> Stats {
    match values {
        [] => Stats::default(),
        [only] => Stats { mean: *only, median: *only, min: *only, max: *only, std_dev: Duration::ZERO },
        _ => {
            let sorted = sorted_copy(values);
            let mean = mean(values);
            Stats {
                mean,
                median: median(&sorted),
                min: sorted[0],
                max: sorted[sorted.len() - 1],
                std_dev: sample_std_dev(values, mean),
            }
        }
    }
}

/// Flags values strictly outside `[Q1 - 1.5*IQR, Q3 + 1.5*IQR]`.
///
/// Needs at least four values; fewer always yields no outliers.
pub fn detect_outliers(values: &[Duration]) -> Vec<Outlier> {
    if values.len() < MIN_OUTLIER_SAMPLES {
        return Vec::new();
    }

    let sorted = sorted_copy(values);
    let q1 = quartile(&sorted, 0.25);
    let q3 = quartile(&sorted, 0.75);
    let iqr = q3 - q1;
    let lower = q1 - IQR_FENCE * iqr;
    let upper = q3 + IQR_FENCE * iqr;
    let mean = exact_mean_nanos(values);

    values.iter().enumerate()
        .filter(|(_, v)| {
            let v = nanos_f64(**v);
            v < lower || v > upper
        })
        .map(|(index, &value)| Outlier { index, value, deviation_pct: deviation_percent(value, mean) })
        .collect()
}

/// Drops every position flagged in `outliers`, keeping the order of the rest.
pub fn exclude_outliers<'a>(values: &'a [Duration], outliers: &[Outlier]) -> Cow<'a, [Duration]> {
    if outliers.is_empty() {
        return Cow::Borrowed(values);
    }
    let flagged: HashSet<usize> = outliers.iter().map(|o| o.index).collect();
    Cow::Owned(
        values.iter().enumerate()
            .filter(|(i, _)| !flagged.contains(i))
            .map(|(_, v)| *v)
            .collect(),
    )
}

/// `(value - mean) / mean * 100`. A zero mean gives `+inf` for a positive
/// value and `0` for a zero value.
pub fn deviation_percent(value: Duration, mean_nanos: f64) -> f64 {
    let v = nanos_f64(value);
    if mean_nanos == 0.0 {
        return if v == 0.0 { 0.0 } else { f64::INFINITY };
    }
    (v - mean_nanos) / mean_nanos * 100.0
}

/// Linear-interpolation quantile over an ascending slice, in nanoseconds.
fn quartile(sorted: &[Duration], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let index = p * (sorted.len() - 1) as f64;
    let lower = index.floor() as usize;
    let upper = index.ceil() as usize;
    if lower == upper {
        return nanos_f64(sorted[lower]);
    }
    let weight = index - lower as f64;
    nanos_f64(sorted[lower]) * (1.0 - weight) + nanos_f64(sorted[upper]) * weight
}

fn sorted_copy(values: &[Duration]) -> Vec<Duration> {
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    sorted
}

fn mean(values: &[Duration]) -> Duration {
    let sum: u128 = values.iter().map(Duration::as_nanos).sum();
    from_nanos(sum / values.len() as u128)
}

fn exact_mean_nanos(values: &[Duration]) -> f64 {
    let sum: u128 = values.iter().map(Duration::as_nanos).sum();
    sum as f64 / values.len() as f64
}

fn median(sorted: &[Duration]) -> Duration {
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        from_nanos((sorted[n / 2 - 1].as_nanos() + sorted[n / 2].as_nanos()) / 2)
    }
}

// Bessel-corrected (n - 1).
fn sample_std_dev(values: &[Duration], mean: Duration) -> Duration {
    if values.len() < 2 {
        return Duration::ZERO;
    }
    let mean = nanos_f64(mean);
    let sum_squares: f64 = values.iter()
        .map(|v| {
            let diff = nanos_f64(*v) - mean;
            diff * diff
        })
        .sum();
    let variance = sum_squares / (values.len() - 1) as f64;
    Duration::from_nanos(variance.sqrt().round() as u64)
}

fn nanos_f64(d: Duration) -> f64 {
    d.as_nanos() as f64
}

fn from_nanos(n: u128) -> Duration {
    Duration::from_nanos(u64::try_from(n).unwrap_or(u64::MAX))
}
