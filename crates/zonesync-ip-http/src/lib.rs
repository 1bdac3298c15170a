// # HTTP IP resolver
//
// Resolves the host's current public IPv4 address by asking an external
// HTTP service that answers with the caller's address as plain text.
//
// The default service is ipify; any endpoint with the same plain-text
// contract can be configured instead. Every failure maps to the core's
// `IpResolution` error, which aborts a reconciliation pass before any
// zone mutation is attempted.

use std::env;
use std::net::Ipv4Addr;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use zonesync_core::error::{Error, Result};
use zonesync_core::traits::IpResolver;

/// Default IP lookup service, answers with a plain text IPv4 address
const DEFAULT_RESOLVER_URL: &str = "https://api.ipify.org?format=text";

/// HTTP timeout for lookup requests
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

const ENV_URL: &str = "ZONESYNC_IP_RESOLVER_URL";

/// HTTP-backed public IPv4 resolver
#[derive(Debug, Clone)]
pub struct HttpIpResolver {
    url: String,
    client: reqwest::Client,
}

impl HttpIpResolver {
    /// Create a resolver asking `url` for the current address
    pub fn new(url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .unwrap_or_default();

        Self {
            url: url.into(),
            client,
        }
    }

    /// Create a resolver from `ZONESYNC_IP_RESOLVER_URL`, falling back to
    /// the default service
    pub fn from_env() -> Self {
        match env::var(ENV_URL) {
            Ok(url) if !url.is_empty() => Self::new(url),
            _ => Self::default(),
        }
    }
}

impl Default for HttpIpResolver {
    fn default() -> Self {
        Self::new(DEFAULT_RESOLVER_URL)
    }
}

#[async_trait]
impl IpResolver for HttpIpResolver {
    async fn ipv4(&self) -> Result<Ipv4Addr> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|err| Error::ip_resolution(format!("request to '{}' failed: {err}", self.url)))?;

        if !response.status().is_success() {
            return Err(Error::ip_resolution(format!(
                "'{}' answered with HTTP status {}",
                self.url,
                response.status().as_u16()
            )));
        }

        let text = response.text().await.map_err(|err| {
            Error::ip_resolution(format!("reading response from '{}' failed: {err}", self.url))
        })?;

        let ip = parse_ipv4(&text)?;
        debug!(ip = %ip, "resolved public IPv4 address");
        Ok(ip)
    }
}

fn parse_ipv4(text: &str) -> Result<Ipv4Addr> {
    let trimmed = text.trim();
    trimmed
        .parse()
        .map_err(|_| Error::ip_resolution(format!("'{trimmed}' is not an IPv4 address")))
}
