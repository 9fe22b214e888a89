use std::net::IpAddr;
use hickory_resolver::TokioAsyncResolver;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use crate::domain::TtffError;
use crate::ports::DnsResolver;

/// Shared by both fetchers. Answers are never cached, so every pass and both
/// legs of a comparison pay for a real lookup.
#[derive(Clone)]
pub struct HickoryDnsResolver {
    resolver: TokioAsyncResolver,
}

impl HickoryDnsResolver {
    pub fn new() -> Self {
        Self { resolver: TokioAsyncResolver::tokio(ResolverConfig::default(), resolver_opts()) }
    }
}

fn resolver_opts() -> ResolverOpts {
    let mut opts = ResolverOpts::default();
    opts.cache_size = 0;
    opts
}

impl Default for HickoryDnsResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl DnsResolver for HickoryDnsResolver {
    async fn resolve(&self, host: &str) -> Result<Vec<IpAddr>, TtffError> {
        let response = self.resolver.lookup_ip(host).await
            .map_err(|e| TtffError::dns(format!("DNS lookup failed for '{}': {}", host, e)))?;
        let ips: Vec<IpAddr> = response.iter().collect();
        if ips.is_empty() {
            return Err(TtffError::dns(format!("no DNS records for '{}'", host)));
        }
        Ok(ips)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answer_cache_is_disabled() {
        assert_eq!(resolver_opts().cache_size, 0);
    }
}
