mod dns;
mod tcp;
mod tls;
mod http;
mod quic;
mod clock;
mod ffprobe;
mod m3u8;
mod renderer;

pub use dns::HickoryDnsResolver;
pub use tcp::TokioTcpDialer;
pub use tls::RustlsTlsHandshaker;
pub use http::{HyperHttpClient, USER_AGENT};
pub use quic::{QuinnDialer, QuinnConnection};
pub use clock::TokioClock;
pub use ffprobe::{FfprobeDetector, parse_probe_output};
pub use m3u8::M3u8PlaylistParser;
pub use renderer::{PrettyRenderer, JsonRenderer, format_ms, format_delta};
