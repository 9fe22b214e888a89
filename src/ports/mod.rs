mod dns;
mod tcp;
mod tls;
mod http;
mod quic;
mod fetch;
mod clock;
mod playlist;
mod detector;
mod renderer;
mod io;

pub use dns::DnsResolver;
pub use tcp::TcpDialer;
pub use tls::{TlsHandshaker, TlsSession};
pub use http::{HttpClient, HttpResponse, HttpVersion};
pub use quic::{QuicDialer, QuicConnection};
pub use fetch::{Fetcher, Fetched};
pub use clock::Clock;
pub use playlist::PlaylistParser;
pub use detector::FrameDetector;
pub use renderer::Renderer;
pub use io::{IoStream, BoxedIoStream};
