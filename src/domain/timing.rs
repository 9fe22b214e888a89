use std::fmt;
use std::time::Duration;
use serde::Serialize;

/// Which transport stack produced a trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportKind {
    /// HTTP/1.1 or HTTP/2 over TCP (+TLS).
    Stream,
    /// HTTP/3 over QUIC; connect and handshake are one phase.
    Multiplexed,
}

impl TransportKind {
    pub fn label(&self) -> &'static str {
        match self {
            TransportKind::Stream => "HTTP/1.1-2",
            TransportKind::Multiplexed => "HTTP/3",
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StreamTrace {
    #[serde(rename = "dns_ms", serialize_with = "super::millis::serialize")]
    pub dns: Duration,
    #[serde(rename = "connect_ms", serialize_with = "super::millis::serialize")]
    pub connect: Duration,
    #[serde(rename = "tls_ms", serialize_with = "super::millis::serialize")]
    pub tls_handshake: Duration,
    #[serde(rename = "ttfb_ms", serialize_with = "super::millis::serialize")]
    pub ttfb: Duration,
    #[serde(rename = "total_ms", serialize_with = "super::millis::serialize")]
    pub total: Duration,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MultiplexedTrace {
    #[serde(rename = "dns_ms", serialize_with = "super::millis::serialize")]
    pub dns: Duration,
    #[serde(rename = "quic_ms", serialize_with = "super::millis::serialize")]
    pub quic_handshake: Duration,
    #[serde(rename = "ttfb_ms", serialize_with = "super::millis::serialize")]
    pub ttfb: Duration,
    #[serde(rename = "total_ms", serialize_with = "super::millis::serialize")]
    pub total: Duration,
}

/// Phase durations of one fetch.
///
/// TTFB and the connection phases overlap (TTFB is measured from fetch
/// start), and `total` is its own wall-clock span, so the phases must not
/// be summed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "transport", rename_all = "snake_case")]
pub enum Trace {
    Stream(StreamTrace),
    Multiplexed(MultiplexedTrace),
}

impl Trace {
    pub fn transport(&self) -> TransportKind {
        match self {
            Trace::Stream(_) => TransportKind::Stream,
            Trace::Multiplexed(_) => TransportKind::Multiplexed,
        }
    }

    pub fn dns(&self) -> Duration {
        match self {
            Trace::Stream(t) => t.dns,
            Trace::Multiplexed(t) => t.dns,
        }
    }

    pub fn ttfb(&self) -> Duration {
        match self {
            Trace::Stream(t) => t.ttfb,
            Trace::Multiplexed(t) => t.ttfb,
        }
    }

    pub fn total(&self) -> Duration {
        match self {
            Trace::Stream(t) => t.total,
            Trace::Multiplexed(t) => t.total,
        }
    }

    pub fn connect(&self) -> Option<Duration> {
        match self {
            Trace::Stream(t) => Some(t.connect),
            Trace::Multiplexed(_) => None,
        }
    }

    pub fn tls_handshake(&self) -> Option<Duration> {
        match self {
            Trace::Stream(t) => Some(t.tls_handshake),
            Trace::Multiplexed(_) => None,
        }
    }

    pub fn quic_handshake(&self) -> Option<Duration> {
        match self {
            Trace::Stream(_) => None,
            Trace::Multiplexed(t) => Some(t.quic_handshake),
        }
    }
}
