mod report;
mod timing;
mod trace;
mod sample;
mod stats;
mod playlist;
mod delay;
mod error;
pub mod millis;

pub use report::{Report, SingleReport, MultiReport, ComparisonReport, PhaseValue, StatsRow, ComparisonRow};
pub use timing::{Trace, StreamTrace, MultiplexedTrace, TransportKind};
pub use trace::{StreamTraceRecorder, StreamEvent, MultiplexedTraceRecorder, MultiplexedEvent};
pub use sample::{Sample, AssetSample, Measurement, MeasurementKind, Phase, phase_values, totals};
pub use stats::{Stats, Outlier, compute_stats, detect_outliers, exclude_outliers, deviation_percent};
pub use playlist::Playlist;
pub use delay::DelayPolicy;
pub use error::{ErrorClass, TtffError};
