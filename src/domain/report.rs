use std::time::Duration;
use serde::Serialize;
use super::{Outlier, Phase, Stats, TransportKind};

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Report {
    Single(SingleReport),
    Multi(MultiReport),
    Comparison(ComparisonReport),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PhaseValue {
    pub phase: Phase,
    #[serde(rename = "value_ms", serialize_with = "super::millis::serialize")]
    pub value: Duration,
}

#[derive(Debug, Clone, Serialize)]
pub struct SingleReport {
    pub url: String,
    pub transport: TransportKind,
    pub rows: Vec<PhaseValue>,
    pub total_label: &'static str,
    #[serde(rename = "total_ms", serialize_with = "super::millis::serialize")]
    pub total: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatsRow {
    pub phase: Phase,
    pub stats: Stats,
}

#[derive(Debug, Clone, Serialize)]
pub struct MultiReport {
    pub url: String,
    pub transport: TransportKind,
    pub samples: usize,
    /// True when detected outliers were left out of the row statistics.
    pub outliers_excluded: bool,
    pub rows: Vec<StatsRow>,
    pub total_label: &'static str,
    pub total: Stats,
    pub outliers: Vec<Outlier>,
}

impl MultiReport {
    pub fn mean_label(&self) -> &'static str {
        if self.outliers_excluded { "Avg*" } else { "Avg" }
    }
}

/// One phase measured on two transports. A `None` side means the phase
/// does not exist on that transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ComparisonRow {
    pub label: &'static str,
    #[serde(rename = "first_ms", serialize_with = "super::millis::option::serialize")]
    pub first: Option<Duration>,
    #[serde(rename = "second_ms", serialize_with = "super::millis::option::serialize")]
    pub second: Option<Duration>,
}

impl ComparisonRow {
    /// Signed `second - first` in milliseconds, when both sides apply.
    pub fn delta_ms(&self) -> Option<f64> {
        match (self.first, self.second) {
            (Some(a), Some(b)) => Some(super::millis::as_ms(b) - super::millis::as_ms(a)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ComparisonReport {
    pub url: String,
    pub samples: usize,
    pub first: TransportKind,
    pub second: TransportKind,
    pub rows: Vec<ComparisonRow>,
    pub total: ComparisonRow,
}
