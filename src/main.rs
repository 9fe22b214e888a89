use std::process::ExitCode;
use std::time::Duration;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use ttff::application::{parse_delay_range, parse_duration, Config, QuicFetcher, StreamFetcher, TtffProbe};
use ttff::domain::{DelayPolicy, MeasurementKind, TransportKind, TtffError};
use ttff::infrastructure::{
    FfprobeDetector, HickoryDnsResolver, HyperHttpClient, JsonRenderer, M3u8PlaylistParser, PrettyRenderer,
    QuinnDialer, RustlsTlsHandshaker, TokioClock, TokioTcpDialer,
};
use ttff::ports::Renderer;

/// Measures time-to-first-frame of an HLS stream, phase by phase.
///
/// Environment defaults: TTFF_TIMEOUT, TTFF_SAMPLES, TTFF_DELAY,
/// TTFF_DELAY_RANDOM, TTFF_MAX_BODY. Flags override them.
#[derive(Parser, Debug)]
#[command(name = "ttff", version, about)]
struct Cli {
    /// Playlist URL (or any asset URL with --asset)
    #[arg(short, long)]
    url: String,

    /// Budget for one whole measurement pass (e.g. 30s, 1500ms)
    #[arg(short, long, value_parser = duration_arg)]
    timeout: Option<Duration>,

    /// Log progress and per-request details to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Number of measurement passes
    #[arg(short = 'n', long)]
    samples: Option<usize>,

    /// Fixed wait between passes
    #[arg(short, long, value_parser = duration_arg)]
    delay: Option<Duration>,

    /// Random wait between passes, e.g. 2s-8s; wins over --delay
    #[arg(long, value_parser = range_arg)]
    delay_random: Option<(Duration, Duration)>,

    /// Leave IQR outliers (on the total) out of every row
    #[arg(long)]
    exclude_outliers: bool,

    /// Measure HTTP/1.1-2 and HTTP/3 side by side
    #[arg(long, conflicts_with = "http3")]
    compare: bool,

    /// Measure over HTTP/3 only
    #[arg(long)]
    http3: bool,

    /// Time a single asset fetch instead of the full playlist-to-frame path
    #[arg(long)]
    asset: bool,

    /// Output as JSON
    #[arg(short, long)]
    json: bool,
}

fn duration_arg(s: &str) -> Result<Duration, String> {
    parse_duration(s).map_err(|e| e.message)
}

fn range_arg(s: &str) -> Result<(Duration, Duration), String> {
    parse_delay_range(s).map_err(|e| e.message)
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "ttff=debug" } else { "ttff=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with_writer(std::io::stderr)
        .init();

    rustls::crypto::ring::default_provider().install_default().ok();

    let config = match build_config(cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e);
            return exit_code(&e);
        }
    };

    let rt = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error[ERROR]: failed to create runtime: {}", e);
            return ExitCode::from(1);
        }
    };

    rt.block_on(async_main(config))
}

fn build_config(cli: Cli) -> Result<Config, TtffError> {
    let mut config = Config::from_env(cli.url)?
        .with_exclude_outliers(cli.exclude_outliers)
        .with_compare(cli.compare)
        .with_transport(if cli.http3 { TransportKind::Multiplexed } else { TransportKind::Stream })
        .with_kind(if cli.asset { MeasurementKind::Asset } else { MeasurementKind::Ttff })
        .with_json(cli.json);

    if let Some(timeout) = cli.timeout {
        config = config.with_timeout(timeout);
    }
    if let Some(samples) = cli.samples {
        config = config.with_samples(samples);
    }
    if cli.delay.is_some() || cli.delay_random.is_some() {
        config = config.with_delay(DelayPolicy::resolve(cli.delay.unwrap_or_default(), cli.delay_random)?);
    }

    config.validate()
}

async fn async_main(config: Config) -> ExitCode {
    let quic = match QuinnDialer::new() {
        Ok(q) => q,
        Err(e) => { eprintln!("{}", e); return exit_code(&e); }
    };

    let dns = HickoryDnsResolver::new();
    let max_body = config.max_body;
    let json_output = config.json_output;

    let stream = StreamFetcher::new(
        dns.clone(),
        TokioTcpDialer::new(),
        RustlsTlsHandshaker::new(),
        HyperHttpClient::new(),
        TokioClock::new(),
        max_body,
    );
    let multiplexed = QuicFetcher::new(dns, quic, TokioClock::new(), max_body);
    let probe = TtffProbe::new(stream, multiplexed, M3u8PlaylistParser, FfprobeDetector::new(), TokioClock::new(), config);

    match probe.run().await {
        Ok(report) => {
            if json_output {
                print!("{}", JsonRenderer::new().render(&report));
            } else {
                print!("{}", PrettyRenderer::new().render(&report));
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", e);
            exit_code(&e)
        }
    }
}

fn exit_code(e: &TtffError) -> ExitCode {
    ExitCode::from(e.class.exit_code() as u8)
}
