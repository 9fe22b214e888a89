use std::time::Duration;
use serde::Serialize;
use super::{Trace, TransportKind};

/// A named sub-interval reported per measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    DnsLookup,
    TcpConnect,
    TlsHandshake,
    QuicHandshake,
    ManifestTtfb,
    Ttfb,
    SegmentDownload,
    FrameDetection,
}

impl Phase {
    pub fn label(&self) -> &'static str {
        match self {
            Phase::DnsLookup => "DNS Lookup",
            Phase::TcpConnect => "TCP Connect",
            Phase::TlsHandshake => "TLS Handshake",
            Phase::QuicHandshake => "QUIC Handshake",
            Phase::ManifestTtfb => "Manifest TTFB",
            Phase::Ttfb => "TTFB",
            Phase::SegmentDownload => "Segment Download",
            Phase::FrameDetection => "Frame Detection",
        }
    }
}

const TTFF_PHASES: &[Phase] = &[
    Phase::DnsLookup,
    Phase::TcpConnect,
    Phase::TlsHandshake,
    Phase::QuicHandshake,
    Phase::ManifestTtfb,
    Phase::SegmentDownload,
    Phase::FrameDetection,
];

const ASSET_PHASES: &[Phase] = &[
    Phase::DnsLookup,
    Phase::TcpConnect,
    Phase::TlsHandshake,
    Phase::QuicHandshake,
    Phase::Ttfb,
];

/// One complete TTFF pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    /// Trace of the media (leaf) playlist fetch.
    pub manifest: Trace,
    pub segment_total: Duration,
    pub frame_detection: Duration,
    pub total: Duration,
}

impl Sample {
    pub fn new(manifest: Trace, segment: &Trace, frame_detection: Duration) -> Self {
        let segment_total = segment.total();
        Self {
            manifest,
            segment_total,
            frame_detection,
            total: manifest.total() + segment_total + frame_detection,
        }
    }
}

/// One traced fetch of a single asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssetSample {
    pub trace: Trace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasurementKind {
    Ttff,
    Asset,
}

impl MeasurementKind {
    pub fn phases(&self) -> &'static [Phase] {
        match self {
            MeasurementKind::Ttff => TTFF_PHASES,
            MeasurementKind::Asset => ASSET_PHASES,
        }
    }

    pub fn total_label(&self) -> &'static str {
        match self {
            MeasurementKind::Ttff => "Total TTFF",
            MeasurementKind::Asset => "Total Time",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Measurement {
    Ttff(Sample),
    Asset(AssetSample),
}

impl Measurement {
    pub fn kind(&self) -> MeasurementKind {
        match self {
            Measurement::Ttff(_) => MeasurementKind::Ttff,
            Measurement::Asset(_) => MeasurementKind::Asset,
        }
    }

    fn trace(&self) -> &Trace {
        match self {
            Measurement::Ttff(s) => &s.manifest,
            Measurement::Asset(a) => &a.trace,
        }
    }

    pub fn transport(&self) -> TransportKind {
        self.trace().transport()
    }

    /// `None` when the phase does not exist for this measurement's transport
    /// or kind, as opposed to a measured zero.
    pub fn phase(&self, phase: Phase) -> Option<Duration> {
        let trace = self.trace();
        match (self, phase) {
            (_, Phase::DnsLookup) => Some(trace.dns()),
            (_, Phase::TcpConnect) => trace.connect(),
            (_, Phase::TlsHandshake) => trace.tls_handshake(),
            (_, Phase::QuicHandshake) => trace.quic_handshake(),
            (Measurement::Ttff(_), Phase::ManifestTtfb) => Some(trace.ttfb()),
            (Measurement::Asset(_), Phase::Ttfb) => Some(trace.ttfb()),
            (Measurement::Ttff(s), Phase::SegmentDownload) => Some(s.segment_total),
            (Measurement::Ttff(s), Phase::FrameDetection) => Some(s.frame_detection),
            _ => None,
        }
    }

    pub fn total(&self) -> Duration {
        match self {
            Measurement::Ttff(s) => s.total,
            Measurement::Asset(a) => a.trace.total(),
        }
    }
}

/// Column of one phase across measurements, in temporal order. Measurements
/// where the phase does not apply are skipped.
pub fn phase_values(measurements: &[Measurement], phase: Phase) -> Vec<Duration> {
    measurements.iter().filter_map(|m| m.phase(phase)).collect()
}

pub fn totals(measurements: &[Measurement]) -> Vec<Duration> {
    measurements.iter().map(Measurement::total).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MultiplexedTrace, StreamTrace};

    fn ms(v: u64) -> Duration { Duration::from_millis(v) }

    fn stream(total: u64) -> Trace {
        Trace::Stream(StreamTrace { dns: ms(4), connect: ms(9), tls_handshake: ms(21), ttfb: ms(48), total: ms(total) })
    }

    #[test]
    fn test_sample_total_is_manifest_plus_segment_plus_detection() {
        let sample = Sample::new(stream(60), &stream(240), ms(12));
        assert_eq!(sample.segment_total, ms(240));
        assert_eq!(sample.total, ms(312));
    }

    #[test]
    fn test_stream_ttff_has_six_phases() {
        let m = Measurement::Ttff(Sample::new(stream(60), &stream(240), ms(12)));
        let applicable: Vec<Phase> = m.kind().phases().iter().copied().filter(|p| m.phase(*p).is_some()).collect();
        assert_eq!(
            applicable,
            vec![Phase::DnsLookup, Phase::TcpConnect, Phase::TlsHandshake, Phase::ManifestTtfb, Phase::SegmentDownload, Phase::FrameDetection]
        );
        assert_eq!(m.phase(Phase::QuicHandshake), None);
        assert_eq!(m.phase(Phase::Ttfb), None);
    }

    #[test]
    fn test_multiplexed_asset_phases() {
        let trace = Trace::Multiplexed(MultiplexedTrace { dns: ms(1), quic_handshake: ms(25), ttfb: ms(40), total: ms(41) });
        let m = Measurement::Asset(AssetSample { trace });

        let applicable: Vec<Phase> = m.kind().phases().iter().copied().filter(|p| m.phase(*p).is_some()).collect();
        assert_eq!(applicable, vec![Phase::DnsLookup, Phase::QuicHandshake, Phase::Ttfb]);
        assert_eq!(m.total(), ms(41));
        assert_eq!(m.transport(), TransportKind::Multiplexed);
    }

    #[test]
    fn test_phase_values_keep_temporal_order() {
        let a = Measurement::Ttff(Sample::new(stream(60), &stream(100), ms(10)));
        let b = Measurement::Ttff(Sample::new(stream(70), &stream(90), ms(30)));

        assert_eq!(phase_values(&[a, b], Phase::FrameDetection), vec![ms(10), ms(30)]);
        assert_eq!(totals(&[a, b]), vec![ms(170), ms(190)]);
        assert!(phase_values(&[a, b], Phase::QuicHandshake).is_empty());
    }
}
