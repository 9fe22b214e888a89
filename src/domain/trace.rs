//! Per-request lifecycle recorders.
//!
//! A recorder is created when a fetch starts and is owned by that fetch
//! alone. The transport stamps events into it as they happen; `finish`
//! turns the stamps into phase durations once the response is complete.

use std::time::{Duration, Instant};
use super::{MultiplexedTrace, StreamTrace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamEvent {
    DnsStart,
    DnsDone,
    ConnectStart,
    ConnectDone,
    TlsStart,
    TlsDone,
    FirstByte,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MultiplexedEvent {
    DnsStart,
    DnsDone,
    ConnectionReady,
    FirstByte,
}

#[derive(Debug, Clone)]
pub struct StreamTraceRecorder {
    start: Instant,
    dns_start: Option<Instant>,
    dns_done: Option<Instant>,
    connect_start: Option<Instant>,
    connect_done: Option<Instant>,
    tls_start: Option<Instant>,
    tls_done: Option<Instant>,
    first_byte: Option<Instant>,
}

impl StreamTraceRecorder {
    pub fn new(start: Instant) -> Self {
        Self {
            start,
            dns_start: None,
            dns_done: None,
            connect_start: None,
            connect_done: None,
            tls_start: None,
            tls_done: None,
            first_byte: None,
        }
    }

    pub fn record(&mut self, event: StreamEvent, at: Instant) {
        let slot = match event {
            StreamEvent::DnsStart => &mut self.dns_start,
            StreamEvent::DnsDone => &mut self.dns_done,
            StreamEvent::ConnectStart => &mut self.connect_start,
            StreamEvent::ConnectDone => &mut self.connect_done,
            StreamEvent::TlsStart => &mut self.tls_start,
            StreamEvent::TlsDone => &mut self.tls_done,
            StreamEvent::FirstByte => &mut self.first_byte,
        };
        *slot = Some(at);
    }

    pub fn finish(&self, end: Instant) -> StreamTrace {
        StreamTrace {
            dns: span(self.dns_start, self.dns_done),
            connect: span(self.connect_start, self.connect_done),
            tls_handshake: span(self.tls_start, self.tls_done),
            ttfb: span(Some(self.start), self.first_byte),
            total: end.saturating_duration_since(self.start),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MultiplexedTraceRecorder {
    start: Instant,
    dns_start: Option<Instant>,
    dns_done: Option<Instant>,
    connection_ready: Option<Instant>,
    first_byte: Option<Instant>,
}

impl MultiplexedTraceRecorder {
    pub fn new(start: Instant) -> Self {
        Self { start, dns_start: None, dns_done: None, connection_ready: None, first_byte: None }
    }

    pub fn record(&mut self, event: MultiplexedEvent, at: Instant) {
        let slot = match event {
            MultiplexedEvent::DnsStart => &mut self.dns_start,
            MultiplexedEvent::DnsDone => &mut self.dns_done,
            MultiplexedEvent::ConnectionReady => &mut self.connection_ready,
            MultiplexedEvent::FirstByte => &mut self.first_byte,
        };
        *slot = Some(at);
    }

    /// The QUIC handshake covers connect and crypto setup, so it is measured
    /// from the end of resolution (or fetch start) to connection-ready.
    pub fn finish(&self, end: Instant) -> MultiplexedTrace {
        let handshake_from = self.dns_done.unwrap_or(self.start);
        MultiplexedTrace {
            dns: span(self.dns_start, self.dns_done),
            quic_handshake: span(Some(handshake_from), self.connection_ready),
            ttfb: span(Some(self.start), self.first_byte),
            total: end.saturating_duration_since(self.start),
        }
    }
}

fn span(from: Option<Instant>, to: Option<Instant>) -> Duration {
    match (from, to) {
        (Some(from), Some(to)) => to.saturating_duration_since(from),
        _ => Duration::ZERO,
    }
}
