use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tracing::debug;
use crate::domain::*;
use crate::ports::*;
use super::ParsedUrl;

/// HTTP/1.1 or HTTP/2 over TCP, with TLS for `https`.
pub struct StreamFetcher<D, T, L, H, C>
where
    D: DnsResolver,
    T: TcpDialer,
    L: TlsHandshaker,
    H: HttpClient,
    C: Clock,
{
    dns: D,
    tcp: T,
    tls: L,
    http: H,
    clock: C,
    max_body: usize,
}

impl<D, T, L, H, C> StreamFetcher<D, T, L, H, C>
where
    D: DnsResolver,
    T: TcpDialer,
    L: TlsHandshaker,
    H: HttpClient,
    C: Clock,
{
    pub fn new(dns: D, tcp: T, tls: L, http: H, clock: C, max_body: usize) -> Self {
        Self { dns, tcp, tls, http, clock, max_body }
    }

    async fn exchange(&self, url: &ParsedUrl) -> Result<Fetched, TtffError> {
        let mut rec = StreamTraceRecorder::new(self.clock.now());

        let ip = match url.ip_literal() {
            Some(ip) => ip,
            None => {
                rec.record(StreamEvent::DnsStart, self.clock.now());
                let ip = lookup(&self.dns, &url.host).await?;
                rec.record(StreamEvent::DnsDone, self.clock.now());
                ip
            }
        };

        rec.record(StreamEvent::ConnectStart, self.clock.now());
        let stream = self.tcp.connect(ip, url.port).await?;
        rec.record(StreamEvent::ConnectDone, self.clock.now());

        let (stream, version) = if url.is_https() {
            rec.record(StreamEvent::TlsStart, self.clock.now());
            let session = self.tls.handshake(stream, &url.host).await?;
            rec.record(StreamEvent::TlsDone, self.clock.now());
            debug!(host = %url.host, tls = %session.version, alpn = ?session.alpn, "tls established");
            let version = if session.is_h2() { HttpVersion::Http2 } else { HttpVersion::Http1 };
            (session.stream, version)
        } else {
            (stream, HttpVersion::Http1)
        };

        let response = self.http.get(stream, version, url, self.max_body).await?;
        if let Some(at) = response.first_byte_at {
            rec.record(StreamEvent::FirstByte, at);
        }
        let trace = Trace::Stream(rec.finish(self.clock.now()));

        into_fetched(url, response, trace)
    }
}

impl<D, T, L, H, C> Fetcher for StreamFetcher<D, T, L, H, C>
where
    D: DnsResolver,
    T: TcpDialer,
    L: TlsHandshaker,
    H: HttpClient,
    C: Clock,
{
    fn transport(&self) -> TransportKind {
        TransportKind::Stream
    }

    async fn fetch(&self, url: &str, timeout: Duration) -> Result<Fetched, TtffError> {
        let parsed = ParsedUrl::parse(url)?;
        self.clock.timeout(timeout, self.exchange(&parsed)).await?
    }
}

/// HTTP/3 over QUIC. Only `https` locators can be fetched.
pub struct QuicFetcher<D, Q, C>
where
    D: DnsResolver,
    Q: QuicDialer,
    C: Clock,
{
    dns: D,
    quic: Q,
    clock: C,
    max_body: usize,
}

impl<D, Q, C> QuicFetcher<D, Q, C>
where
    D: DnsResolver,
    Q: QuicDialer,
    C: Clock,
{
    pub fn new(dns: D, quic: Q, clock: C, max_body: usize) -> Self {
        Self { dns, quic, clock, max_body }
    }

    async fn exchange(&self, url: &ParsedUrl) -> Result<Fetched, TtffError> {
        if !url.is_https() {
            return Err(TtffError::http(format!("HTTP/3 requires https, got {}", url.full)));
        }

        let mut rec = MultiplexedTraceRecorder::new(self.clock.now());

        let ip = match url.ip_literal() {
            Some(ip) => ip,
            None => {
                rec.record(MultiplexedEvent::DnsStart, self.clock.now());
                let ip = lookup(&self.dns, &url.host).await?;
                rec.record(MultiplexedEvent::DnsDone, self.clock.now());
                ip
            }
        };

        let conn = self.quic.connect(SocketAddr::new(ip, url.port), &url.host).await?;
        rec.record(MultiplexedEvent::ConnectionReady, self.clock.now());

        let response = conn.get(url, self.max_body).await?;
        if let Some(at) = response.first_byte_at {
            rec.record(MultiplexedEvent::FirstByte, at);
        }
        let trace = Trace::Multiplexed(rec.finish(self.clock.now()));

        into_fetched(url, response, trace)
    }
}

impl<D, Q, C> Fetcher for QuicFetcher<D, Q, C>
where
    D: DnsResolver,
    Q: QuicDialer,
    C: Clock,
{
    fn transport(&self) -> TransportKind {
        TransportKind::Multiplexed
    }

    async fn fetch(&self, url: &str, timeout: Duration) -> Result<Fetched, TtffError> {
        let parsed = ParsedUrl::parse(url)?;
        self.clock.timeout(timeout, self.exchange(&parsed)).await?
    }
}

async fn lookup<D: DnsResolver>(dns: &D, host: &str) -> Result<IpAddr, TtffError> {
    let ips = dns.resolve(host).await?;
    ips.first().copied().ok_or_else(|| TtffError::dns(format!("no IP addresses for {}", host)))
}

fn into_fetched(url: &ParsedUrl, response: HttpResponse, trace: Trace) -> Result<Fetched, TtffError> {
    if !response.is_success() {
        return Err(TtffError::http(format!("unexpected status {} for {}", response.status, url.full)));
    }
    debug!(url = %url.full, status = response.status, protocol = response.version, bytes = response.body.len(), "fetched");
    Ok(Fetched {
        url: url.full.clone(),
        protocol: response.version,
        body: response.body,
        trace,
    })
}
