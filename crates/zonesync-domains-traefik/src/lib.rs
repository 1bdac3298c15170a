// # Traefik domain provider
//
// Queries the Traefik API for all of its HTTP routers and extracts an
// effective list of hostnames from their route-matching rules. Only
// routers reported as enabled contribute to the result; every hostname
// appears once, in first-seen order.
//
// Lookup or parse failures never surface to the caller: the provider logs
// them and returns an empty list, leaving the reconciliation loop to try
// again on its next tick.

use std::env;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, error};

use zonesync_core::error::{Error, Result};
use zonesync_core::traits::DomainProvider;

/// HTTP timeout for router lookups
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Router status reported by traefik for usable routers
const ROUTER_STATUS_ENABLED: &str = "enabled";

const ENV_BASE_URI: &str = "ZONESYNC_TRAEFIK_BASE_URI";

/// One router as reported by `GET /api/http/routers`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RouterInfo {
    /// The route-matching rule, e.g. ``Host(`example.com`)``
    #[serde(default)]
    pub rule: String,

    /// Router status: `enabled`, `disabled` or `warning`
    #[serde(default)]
    pub status: String,

    /// The service the router points at, for diagnostics only
    #[serde(default)]
    pub service: String,

    /// Errors traefik attached to the router
    #[serde(default)]
    pub err: Vec<String>,
}

/// Traefik API client acting as a domain provider
#[derive(Debug, Clone)]
pub struct TraefikApi {
    base_uri: String,
    client: reqwest::Client,
}

impl TraefikApi {
    /// Create a provider for the traefik instance at `base_uri`
    pub fn new(base_uri: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .unwrap_or_default();

        Self {
            base_uri: base_uri.into(),
            client,
        }
    }

    /// Create a provider from `ZONESYNC_TRAEFIK_BASE_URI`
    pub fn from_env() -> Result<Self> {
        let base_uri = env::var(ENV_BASE_URI)
            .map_err(|_| Error::config(format!("{ENV_BASE_URI} is required")))?;
        Ok(Self::new(base_uri))
    }

    async fn routers(&self) -> Result<Vec<RouterInfo>> {
        let uri = format!("{}/api/http/routers", self.base_uri);

        let response = self
            .client
            .get(&uri)
            .send()
            .await
            .map_err(|err| Error::http(format!("request to '{uri}' failed: {err}")))?;

        if !response.status().is_success() {
            return Err(Error::http(format!(
                "'{uri}' answered with HTTP status {}",
                response.status().as_u16()
            )));
        }

        let routers: Vec<RouterInfo> = response
            .json()
            .await
            .map_err(|err| Error::http(format!("parsing router list failed: {err}")))?;

        debug!(count = routers.len(), "received routers from traefik");
        Ok(routers)
    }
}

#[async_trait]
impl DomainProvider for TraefikApi {
    async fn domains(&self) -> Vec<String> {
        match self.routers().await {
            Ok(routers) => effective_domains(&routers),
            Err(err) => {
                error!(error = %err, "failed to retrieve routers, won't extract any rules");
                Vec::new()
            }
        }
    }
}

/// Extract the deduplicated hostnames of all enabled routers, in
/// first-seen order
fn effective_domains(routers: &[RouterInfo]) -> Vec<String> {
    let mut domains: Vec<String> = Vec::new();

    for router in routers {
        if router.status != ROUTER_STATUS_ENABLED {
            debug!(
                rule = %router.rule,
                service = %router.service,
                status = %router.status,
                errors = %router.err.join(","),
                "skipping router that is not enabled"
            );
            continue;
        }

        for domain in host_domains(&router.rule) {
            if !domains.contains(&domain) {
                domains.push(domain);
            }
        }
    }

    domains
}

/// Extract the arguments of every `Host(...)` matcher in a router rule.
///
/// Traefik quotes matcher arguments in backticks or double quotes and
/// separates multiple hostnames with commas. Other matchers, including
/// `HostRegexp`, are ignored.
fn host_domains(rule: &str) -> Vec<String> {
    let mut domains = Vec::new();
    let mut rest = rule;

    while let Some(idx) = rest.find("Host(") {
        // reject matches that are a suffix of a longer matcher name
        let standalone = idx == 0
            || rest[..idx]
                .chars()
                .next_back()
                .is_none_or(|c| !c.is_ascii_alphanumeric());

        rest = &rest[idx + "Host(".len()..];
        if !standalone {
            continue;
        }

        let Some(end) = rest.find(')') else {
            break;
        };

        for arg in rest[..end].split(',') {
            let domain = arg.trim().trim_matches(|c| c == '`' || c == '"');
            if !domain.is_empty() {
                domains.push(domain.to_string());
            }
        }

        rest = &rest[end..];
    }

    domains
}
