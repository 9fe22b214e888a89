use std::net::SocketAddr;
use std::time::Duration;
use bytes::Bytes;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use ttff::application::{Config, QuicFetcher, StreamFetcher, TtffProbe};
use ttff::domain::*;
use ttff::infrastructure::*;
use ttff::ports::{FrameDetector, Renderer};

const MASTER: &str = "#EXTM3U\n#EXT-X-STREAM-INF:BANDWIDTH=800000\nlow/index.m3u8\n";
const MEDIA: &str = "#EXTM3U\n#EXT-X-TARGETDURATION:4\n#EXTINF:4.0,\nseg0.ts\n#EXTINF:4.0,\nseg1.ts\n#EXT-X-ENDLIST\n";
const SEGMENT: &[u8] = &[0x47; 188 * 4];
const EMPTY: &[u8] = b"";

struct FixedDetector;

impl FrameDetector for FixedDetector {
    fn check(&self) -> Result<(), TtffError> {
        Ok(())
    }

    async fn detect(&self, segment: Bytes, _deadline: Duration) -> Result<Duration, TtffError> {
        if segment.is_empty() {
            return Err(TtffError::no_frames("no video frames found in segment"));
        }
        Ok(Duration::from_millis(12))
    }
}

async fn serve() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else { return };
            tokio::spawn(async move {
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }
                let head = String::from_utf8_lossy(&request);
                let path = head.split_whitespace().nth(1).unwrap_or("/").to_string();

                let (status, body): (&str, &[u8]) = match path.as_str() {
                    "/live/master.m3u8" => ("200 OK", MASTER.as_bytes()),
                    "/live/low/index.m3u8" => ("200 OK", MEDIA.as_bytes()),
                    "/live/low/seg0.ts" => ("200 OK", SEGMENT),
                    _ => ("404 Not Found", EMPTY),
                };
                let response = format!("HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n", status, body.len());
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.write_all(body).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}

fn probe(config: Config) -> TtffProbe<
    StreamFetcher<HickoryDnsResolver, TokioTcpDialer, RustlsTlsHandshaker, HyperHttpClient, TokioClock>,
    QuicFetcher<HickoryDnsResolver, QuinnDialer, TokioClock>,
    M3u8PlaylistParser,
    FixedDetector,
    TokioClock,
> {
    let _ = rustls::crypto::ring::default_provider().install_default();
    let dns = HickoryDnsResolver::new();
    let max_body = config.max_body;
    let stream = StreamFetcher::new(dns.clone(), TokioTcpDialer::new(), RustlsTlsHandshaker::new(), HyperHttpClient::new(), TokioClock::new(), max_body);
    let quic = QuicFetcher::new(dns, QuinnDialer::new().unwrap(), TokioClock::new(), max_body);
    TtffProbe::new(stream, quic, M3u8PlaylistParser, FixedDetector, TokioClock::new(), config)
}

fn config(url: String, samples: usize) -> Config {
    Config::from_env(url)
        .unwrap()
        .with_timeout(Duration::from_secs(5))
        .with_samples(samples)
        .with_delay(DelayPolicy::Fixed(Duration::ZERO))
        .validate()
        .unwrap()
}

#[tokio::test]
async fn test_full_path_over_loopback() {
    let addr = serve().await;
    let url = format!("http://{}/live/master.m3u8", addr);

    let report = probe(config(url.clone(), 1)).run().await.unwrap();

    let Report::Single(single) = &report else { panic!("expected single report") };
    assert_eq!(single.url, url);
    assert_eq!(single.transport, TransportKind::Stream);

    let value = |phase: Phase| single.rows.iter().find(|r| r.phase == phase).map(|r| r.value);
    // IP literal over plain http: nothing to resolve, nothing to negotiate
    assert_eq!(value(Phase::DnsLookup), Some(Duration::ZERO));
    assert_eq!(value(Phase::TlsHandshake), Some(Duration::ZERO));
    assert_eq!(value(Phase::QuicHandshake), None);
    assert_eq!(value(Phase::FrameDetection), Some(Duration::from_millis(12)));
    assert!(single.total >= Duration::from_millis(12));

    let text = PrettyRenderer::new().render(&report);
    assert!(text.contains("Total TTFF:"));
    assert!(text.contains("Segment Download:"));
}

#[tokio::test]
async fn test_multiple_samples_over_loopback() {
    let addr = serve().await;
    let url = format!("http://{}/live/master.m3u8", addr);

    let report = probe(config(url, 3)).run().await.unwrap();

    let Report::Multi(multi) = report else { panic!("expected multi report") };
    assert_eq!(multi.samples, 3);
    assert!(multi.outliers.is_empty());
    let detect = multi.rows.iter().find(|r| r.phase == Phase::FrameDetection).unwrap();
    assert_eq!(detect.stats.mean, Duration::from_millis(12));
    assert_eq!(detect.stats.std_dev, Duration::ZERO);
}

#[tokio::test]
async fn test_asset_mode_over_loopback() {
    let addr = serve().await;
    let url = format!("http://{}/live/low/seg0.ts", addr);

    let report = probe(config(url, 1).with_kind(MeasurementKind::Asset)).run().await.unwrap();

    let Report::Single(single) = report else { panic!("expected single report") };
    assert_eq!(single.total_label, "Total Time");
    assert!(single.rows.iter().any(|r| r.phase == Phase::Ttfb));
}

#[tokio::test]
async fn test_missing_playlist_fails_with_http_class() {
    let addr = serve().await;
    let url = format!("http://{}/live/gone.m3u8", addr);

    let err = probe(config(url, 2)).run().await.unwrap_err();

    assert_eq!(err.class, ErrorClass::Http);
    assert_eq!(err.class.exit_code(), 6);
    assert!(err.message.starts_with("sample 1/2: fetch playlist"));
    assert!(err.message.contains("404"));
}

#[tokio::test]
async fn test_refused_connection_fails_with_tcp_class() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    };
    let url = format!("http://127.0.0.1:{}/live/master.m3u8", port);

    let err = probe(config(url, 1)).run().await.unwrap_err();

    assert_eq!(err.class, ErrorClass::Tcp);
}
