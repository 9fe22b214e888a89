mod probe;
mod traced_fetch;
mod summarize;
mod url_parser;
mod config;

pub use probe::TtffProbe;
pub use traced_fetch::{StreamFetcher, QuicFetcher};
pub use summarize::{single_report, multi_report, comparison_report};
pub use url_parser::{ParsedUrl, resolve, base_of};
pub use config::{Config, parse_duration, parse_delay_range};
