use std::net::IpAddr;
use url::Url;
use crate::domain::TtffError;

#[derive(Debug, Clone)]
pub struct ParsedUrl {
    pub scheme: String,
    pub host: String,
    pub port: u16,
    pub path_and_query: String,
    pub full: String,
}

impl ParsedUrl {
    pub fn parse(input: &str) -> Result<Self, TtffError> {
        let url = Url::parse(input).map_err(|e| TtffError::format(format!("invalid URL '{}': {}", input, e)))?;

        let scheme = url.scheme().to_string();
        if scheme != "http" && scheme != "https" {
            return Err(TtffError::format(format!("unsupported scheme '{}', expected http or https", scheme)));
        }

        let host = url.host_str().ok_or_else(|| TtffError::format(format!("missing host in '{}'", input)))?.to_string();
        let port = url.port_or_known_default().unwrap_or(if scheme == "https" { 443 } else { 80 });

        let path = url.path();
        let path_and_query = match url.query() {
            Some(q) => format!("{}?{}", path, q),
            None => path.to_string(),
        };
        let path_and_query = if path_and_query.is_empty() { "/".to_string() } else { path_and_query };

        Ok(Self { scheme, host, port, path_and_query, full: url.to_string() })
    }

    pub fn is_https(&self) -> bool {
        self.scheme == "https"
    }

    /// The host when it is an address literal; such hosts need no resolution.
    pub fn ip_literal(&self) -> Option<IpAddr> {
        self.host.trim_start_matches('[').trim_end_matches(']').parse().ok()
    }

    /// `host` or `host:port` when the port is not the scheme default.
    pub fn authority(&self) -> String {
        let default_port = if self.is_https() { 443 } else { 80 };
        if self.port == default_port {
            self.host.clone()
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

/// Resolves a playlist reference against the directory it was listed in.
/// Absolute http(s) references are returned untouched.
pub fn resolve(base: &str, reference: &str) -> Result<String, TtffError> {
    if reference.starts_with("http://") || reference.starts_with("https://") {
        return Ok(reference.to_string());
    }
    let base = Url::parse(base).map_err(|e| TtffError::format(format!("invalid base URL '{}': {}", base, e)))?;
    let resolved = base.join(reference)
        .map_err(|e| TtffError::format(format!("invalid reference '{}': {}", reference, e)))?;
    Ok(resolved.to_string())
}

/// Drops the last path segment, keeping the trailing slash.
pub fn base_of(locator: &str) -> Result<String, TtffError> {
    let mut url = Url::parse(locator).map_err(|e| TtffError::format(format!("invalid URL '{}': {}", locator, e)))?;
    let dir = match url.path().rfind('/') {
        Some(idx) => url.path()[..=idx].to_string(),
        None => return Ok(url.to_string()),
    };
    url.set_path(&dir);
    Ok(url.to_string())
}
