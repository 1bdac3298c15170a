// # Froxlor zone-record backend
//
// Adapter for the Froxlor "REST" API. All calls work in the context of a
// customer, so the configured key/secret pair must belong to a customer
// account; administrative interactions are not available.
//
// The API is a single POST endpoint taking a JSON envelope of
// `{header: {apikey, secret}, body: {command, params}}`. Responses carry
// their own status code next to the HTTP one; both must be 200 for a call
// to count as successful.
//
// This crate implements the core's `ZoneRepository` and `ExistenceChecker`
// seams and registers the "froxlor" processor, wired to the HTTP IP
// resolver, with the processor registry.

use std::env;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;

use zonesync_core::error::{Error, Result};
use zonesync_core::reconciler::Reconciler;
use zonesync_core::registry::ProcessorRegistry;
use zonesync_core::traits::{
    DomainProcessor, ExistenceChecker, ProcessorFactory, ZoneEntry, ZoneRepository,
};
use zonesync_ip_http::HttpIpResolver;

/// Processor id the froxlor backend registers under
pub const PROCESSOR_ID: &str = "froxlor";

/// Path of the API endpoint below the configured base URI
const API_PATH: &str = "/froxlor/api.php";

/// HTTP timeout for API requests
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

const ENV_URI: &str = "ZONESYNC_FROXLOR_URI";
const ENV_KEY: &str = "ZONESYNC_FROXLOR_KEY";
const ENV_SECRET: &str = "ZONESYNC_FROXLOR_SECRET";

/// Froxlor API client
pub struct FroxlorApi {
    base_uri: String,
    api_key: String,
    secret: String,
    client: reqwest::Client,
}

// the key/secret pair must never leak into logs
impl fmt::Debug for FroxlorApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FroxlorApi")
            .field("base_uri", &self.base_uri)
            .field("api_key", &"<REDACTED>")
            .field("secret", &"<REDACTED>")
            .finish()
    }
}

impl FroxlorApi {
    /// Create a new client for the panel reachable under `base_uri`
    pub fn new(
        base_uri: impl Into<String>,
        api_key: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .unwrap_or_default();

        Self {
            base_uri: base_uri.into(),
            api_key: api_key.into(),
            secret: secret.into(),
            client,
        }
    }

    /// Create a client from `ZONESYNC_FROXLOR_{URI,KEY,SECRET}`
    pub fn from_env() -> Result<Self> {
        let base_uri =
            env::var(ENV_URI).map_err(|_| Error::config(format!("{ENV_URI} is required")))?;
        let api_key =
            env::var(ENV_KEY).map_err(|_| Error::config(format!("{ENV_KEY} is required")))?;
        let secret =
            env::var(ENV_SECRET).map_err(|_| Error::config(format!("{ENV_SECRET} is required")))?;

        Ok(Self::new(base_uri, api_key, secret))
    }

    fn endpoint(&self) -> String {
        let base = self.base_uri.strip_suffix('/').unwrap_or(&self.base_uri);
        format!("{base}{API_PATH}")
    }

    async fn post<T>(&self, command: Command) -> Result<T>
    where
        T: serde::de::DeserializeOwned + FroxlorBody + Default,
    {
        debug!(command = command.command, "calling froxlor API");

        let request = Request {
            header: RequestHeader {
                apikey: &self.api_key,
                secret: &self.secret,
            },
            body: &command,
        };

        let response = self
            .client
            .post(self.endpoint())
            .json(&request)
            .send()
            .await
            .map_err(|err| Error::http(format!("froxlor request failed: {err}")))?;

        let http_status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|err| Error::http(format!("reading froxlor response failed: {err}")))?;

        if bytes.is_empty() {
            // froxlor omits the body entirely for not-modified responses
            if http_status == StatusCode::NOT_MODIFIED {
                return Ok(T::default());
            }
            return Err(Error::http(format!(
                "froxlor API returned no body with HTTP status {}",
                http_status.as_u16()
            )));
        }

        let body: T = serde_json::from_slice(&bytes)?;

        // check the HTTP status code and the body status code
        if http_status != StatusCode::OK || body.status().status != 200 {
            return Err(Error::http(format!(
                "froxlor API HTTP response code is '{}' and body response code '{}' with reason '{}'",
                http_status.as_u16(),
                body.status().status,
                body.status().status_message,
            )));
        }

        Ok(body)
    }
}

#[async_trait]
impl ZoneRepository for FroxlorApi {
    async fn find(&self, apex: &str, label: &str) -> Result<Vec<ZoneEntry>> {
        let body: ZoneList = self.post(commands::list_zones(apex, label)).await?;
        Ok(body.data.list)
    }

    async fn add(
        &self,
        apex: &str,
        label: &str,
        content: &str,
        ttl: u32,
        entry_type: &str,
    ) -> Result<()> {
        self.post::<Ack>(commands::add_zone(apex, label, content, ttl, entry_type))
            .await
            .map(|_| ())
    }

    async fn delete(&self, apex: &str, entry_id: &str) -> Result<()> {
        self.post::<Ack>(commands::delete_zone(apex, entry_id))
            .await
            .map(|_| ())
    }
}

#[async_trait]
impl ExistenceChecker for FroxlorApi {
    async fn exists(&self, fqn: &str) -> Result<bool> {
        let body: CountedList = self.post(commands::list_subdomains(fqn)).await?;
        Ok(body.data.count > 0)
    }

    async fn register_subdomain(&self, apex: &str, label: &str) -> Result<()> {
        self.post::<Ack>(commands::add_subdomain(apex, label))
            .await
            .map(|_| ())
    }
}

/// Factory creating the froxlor reconciliation processor from environment
/// variables
pub struct FroxlorProcessorFactory;

impl ProcessorFactory for FroxlorProcessorFactory {
    fn create(&self) -> Result<Box<dyn DomainProcessor>> {
        let api = FroxlorApi::from_env()?;
        let resolver = HttpIpResolver::from_env();

        Ok(Box::new(Reconciler::new(
            PROCESSOR_ID,
            Arc::new(api),
            Box::new(resolver),
        )))
    }
}

/// Register the froxlor processor with a registry
pub fn register(registry: &ProcessorRegistry) {
    registry.register(PROCESSOR_ID, Box::new(FroxlorProcessorFactory));
}

#[derive(Serialize)]
struct Request<'a> {
    header: RequestHeader<'a>,
    body: &'a Command,
}

#[derive(Serialize)]
struct RequestHeader<'a> {
    apikey: &'a str,
    secret: &'a str,
}

/// One API command and its parameters
#[derive(Debug, Serialize)]
struct Command {
    command: &'static str,
    params: serde_json::Value,
}

mod commands {
    use serde_json::json;

    use super::Command;

    pub(super) fn list_zones(apex: &str, label: &str) -> Command {
        Command {
            command: "DomainZones.listing",
            params: json!({
                "domainname": apex,
                "sql_search": {
                    "record": { "op": "=", "value": label },
                },
            }),
        }
    }

    pub(super) fn delete_zone(apex: &str, entry_id: &str) -> Command {
        Command {
            command: "DomainZones.delete",
            params: json!({
                "domainname": apex,
                "entry_id": entry_id,
            }),
        }
    }

    pub(super) fn add_zone(
        apex: &str,
        label: &str,
        content: &str,
        ttl: u32,
        entry_type: &str,
    ) -> Command {
        Command {
            command: "DomainZones.Add",
            params: json!({
                "domainname": apex,
                "record": label,
                "content": content,
                "ttl": ttl.to_string(),
                "type": entry_type,
            }),
        }
    }

    pub(super) fn list_subdomains(fqn: &str) -> Command {
        // froxlor joins tables internally, so the sql_search column needs
        // the table prefix
        Command {
            command: "SubDomains.listing",
            params: json!({
                "sql_search": {
                    "d.domain": { "op": "=", "value": fqn },
                },
            }),
        }
    }

    pub(super) fn add_subdomain(apex: &str, label: &str) -> Command {
        Command {
            command: "SubDomains.add",
            params: json!({
                "domain": apex,
                "subdomain": label,
            }),
        }
    }
}

/// Common shape of every froxlor response body
trait FroxlorBody {
    fn status(&self) -> &Status;
}

#[derive(Debug, Default, Deserialize)]
struct Status {
    #[serde(default)]
    status: u16,
    #[serde(default)]
    status_message: String,
}

/// Response without payload, e.g. for add/delete calls
#[derive(Debug, Default, Deserialize)]
struct Ack {
    #[serde(flatten)]
    status: Status,
}

impl FroxlorBody for Ack {
    fn status(&self) -> &Status {
        &self.status
    }
}

/// Response of `DomainZones.listing`
#[derive(Debug, Default, Deserialize)]
struct ZoneList {
    #[serde(flatten)]
    status: Status,
    #[serde(default)]
    data: ZoneListData,
}

#[derive(Debug, Default, Deserialize)]
struct ZoneListData {
    #[serde(default)]
    count: u32,
    #[serde(default)]
    list: Vec<ZoneEntry>,
}

impl FroxlorBody for ZoneList {
    fn status(&self) -> &Status {
        &self.status
    }
}

/// Response of `SubDomains.listing`; only the count matters
#[derive(Debug, Default, Deserialize)]
struct CountedList {
    #[serde(flatten)]
    status: Status,
    #[serde(default)]
    data: CountData,
}

#[derive(Debug, Default, Deserialize)]
struct CountData {
    #[serde(default)]
    count: u32,
}

impl FroxlorBody for CountedList {
    fn status(&self) -> &Status {
        &self.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn list_zones_command_shape() {
        let command = commands::list_zones("foo.bar", "@");
        assert_eq!(
            serde_json::to_value(&command).unwrap(),
            json!({
                "command": "DomainZones.listing",
                "params": {
                    "domainname": "foo.bar",
                    "sql_search": {
                        "record": { "op": "=", "value": "@" },
                    },
                },
            })
        );
    }

    #[test]
    fn add_zone_command_sends_ttl_as_string() {
        let command = commands::add_zone("foo.bar", "sub", "127.0.0.1", 18_000, "A");
        assert_eq!(
            serde_json::to_value(&command).unwrap(),
            json!({
                "command": "DomainZones.Add",
                "params": {
                    "domainname": "foo.bar",
                    "record": "sub",
                    "content": "127.0.0.1",
                    "ttl": "18000",
                    "type": "A",
                },
            })
        );
    }

    #[test]
    fn subdomain_listing_searches_with_table_prefix() {
        let command = commands::list_subdomains("sub.foo.bar");
        assert_eq!(
            serde_json::to_value(&command).unwrap(),
            json!({
                "command": "SubDomains.listing",
                "params": {
                    "sql_search": {
                        "d.domain": { "op": "=", "value": "sub.foo.bar" },
                    },
                },
            })
        );
    }

    #[test]
    fn request_envelope_carries_credentials_in_header() {
        let command = commands::delete_zone("foo.bar", "98");
        let request = Request {
            header: RequestHeader {
                apikey: "key",
                secret: "sssh",
            },
            body: &command,
        };

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "header": { "apikey": "key", "secret": "sssh" },
                "body": {
                    "command": "DomainZones.delete",
                    "params": { "domainname": "foo.bar", "entry_id": "98" },
                },
            })
        );
    }

    #[test]
    fn zone_list_response_parses_entries() {
        let raw = json!({
            "status": 200,
            "status_message": "",
            "data": {
                "count": 1,
                "list": [{
                    "id": "98",
                    "domain_id": "1337",
                    "ttl": "18000",
                    "record": "@",
                    "type": "A",
                    "content": "127.0.0.1",
                }],
            },
        });

        let body: ZoneList = serde_json::from_value(raw).unwrap();
        assert_eq!(body.status.status, 200);
        assert_eq!(body.data.count, 1);
        assert_eq!(body.data.list[0].id, "98");
        assert_eq!(body.data.list[0].label, "@");
        assert_eq!(body.data.list[0].entry_type, "A");
        assert_eq!(body.data.list[0].content, "127.0.0.1");
    }

    #[test]
    fn error_response_carries_status_and_message() {
        let raw = json!({
            "status": 403,
            "status_message": "invalid credentials",
        });

        let body: Ack = serde_json::from_value(raw).unwrap();
        assert_eq!(body.status.status, 403);
        assert_eq!(body.status.status_message, "invalid credentials");
    }

    #[test]
    fn counted_list_defaults_to_zero_without_data() {
        let body: CountedList = serde_json::from_value(json!({ "status": 200 })).unwrap();
        assert_eq!(body.data.count, 0);
    }

    #[test]
    fn endpoint_strips_trailing_slash() {
        let api = FroxlorApi::new("https://panel.example.com/", "key", "secret");
        assert_eq!(api.endpoint(), "https://panel.example.com/froxlor/api.php");

        let api = FroxlorApi::new("https://panel.example.com", "key", "secret");
        assert_eq!(api.endpoint(), "https://panel.example.com/froxlor/api.php");
    }

    #[test]
    fn debug_redacts_credentials() {
        let api = FroxlorApi::new("https://panel.example.com", "api-key-value", "sssh");
        let rendered = format!("{api:?}");
        assert!(!rendered.contains("api-key-value"), "{rendered}");
        assert!(!rendered.contains("sssh"), "{rendered}");
        assert!(rendered.contains("<REDACTED>"));
    }
}
