// # NetBox DNS Client
//
// This crate provides the NetBox REST implementation of the RecordStore
// trait from netbox-dns-core.
//
// ## Behaviour
//
// - One HTTP request per store call, plus one per extra result page
// - Full error propagation; no retry or backoff here
// - HTTP timeout of 30 seconds
// - Specific error handling for HTTP status codes (401/403, 404, 429, 5xx)
//
// ## Security Requirements
//
// - API token NEVER appears in logs or Debug output
// - Construction fails if the token is empty
//
// ## API Reference
//
// - List views: GET `/api/plugins/netbox-dns/views/?name=...`
// - List zones: GET `/api/plugins/netbox-dns/zones/?name=...&view_id=...` (`view=null`
//   for zones without a view)
// - List records: GET `/api/plugins/netbox-dns/records/?zone_id=...&name=...&type=...&status=...`
// - Create record: POST `/api/plugins/netbox-dns/records/`
// - Update record: PATCH `/api/plugins/netbox-dns/records/:id/`
// - Delete record: DELETE `/api/plugins/netbox-dns/records/:id/`

use async_trait::async_trait;
use netbox_dns_core::config::SourceConfig;
use netbox_dns_core::traits::{
    NewRecord, RecordQuery, RecordStatus, RecordStore, RemoteRecord, RemoteView, RemoteZone,
    ViewFilter,
};
use netbox_dns_core::{Error, Result};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Path of the DNS plugin API below the NetBox base URL
const API_PREFIX: &str = "/api/plugins/netbox-dns";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// One page of a NetBox list response
#[derive(Debug, Deserialize)]
struct Page<T> {
    next: Option<String>,
    results: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct WireView {
    id: u64,
    name: String,
}

#[derive(Debug, Deserialize)]
struct WireZone {
    id: u64,
    name: String,
    #[serde(default)]
    default_ttl: Option<u32>,
    #[serde(default)]
    soa_refresh: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct WireZoneRef {
    id: u64,
}

/// NetBox renders choice fields either as a bare string or as
/// `{"value": ..., "label": ...}`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireStatus {
    Plain(String),
    Choice { value: String },
}

impl WireStatus {
    fn status(&self) -> RecordStatus {
        let value = match self {
            WireStatus::Plain(value) | WireStatus::Choice { value } => value,
        };
        if value == RecordStatus::Active.as_str() {
            RecordStatus::Active
        } else {
            RecordStatus::Inactive
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireRecord {
    id: u64,
    zone: WireZoneRef,
    name: String,
    #[serde(rename = "type")]
    record_type: String,
    value: String,
    #[serde(default)]
    ttl: Option<u32>,
    status: WireStatus,
}

impl From<WireRecord> for RemoteRecord {
    fn from(wire: WireRecord) -> Self {
        RemoteRecord {
            id: wire.id,
            zone_id: wire.zone.id,
            status: wire.status.status(),
            name: wire.name,
            record_type: wire.record_type,
            value: wire.value,
            ttl: wire.ttl,
        }
    }
}

/// NetBox DNS plugin REST client
///
/// # Security
///
/// The Debug implementation intentionally does NOT expose the API token.
pub struct NetboxClient {
    /// Base URL without trailing slash
    base_url: String,

    /// NetBox API token
    /// ⚠️ NEVER log this value
    token: String,

    /// HTTP client for API requests
    client: reqwest::Client,
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for NetboxClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetboxClient")
            .field("base_url", &self.base_url)
            .field("token", &"<REDACTED>")
            .finish()
    }
}

impl NetboxClient {
    /// Create a new NetBox client
    ///
    /// # Parameters
    ///
    /// - `url`: NetBox base URL, e.g. `https://netbox.example.com`
    /// - `token`: API token with read/write access to the DNS plugin
    ///
    /// # Returns
    ///
    /// - `Ok(NetboxClient)`: Ready to use
    /// - `Err(Error::Config)`: Empty URL or token
    /// - `Err(Error::Http)`: The HTTP client could not be built
    pub fn new(url: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        let base_url = url.into().trim_end_matches('/').to_string();
        let token = token.into();

        if base_url.is_empty() {
            return Err(Error::config("NetBox URL cannot be empty"));
        }
        if token.is_empty() {
            return Err(Error::config("NetBox API token cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url,
            token,
            client,
        })
    }

    /// Create a client for a source configuration
    pub fn from_config(config: &SourceConfig) -> Result<Self> {
        Self::new(config.url.clone(), config.token.clone())
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}/{}", self.base_url, API_PREFIX, path)
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .header("Authorization", format!("Token {}", self.token))
            .header("Accept", "application/json")
    }

    /// Send a request and map a non-success status to an error
    async fn send(
        &self,
        operation: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response> {
        let response = request
            .send()
            .await
            .map_err(|e| Error::http(format!("{}: HTTP request failed: {}", operation, e)))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read error response".to_string());

        tracing::warn!(operation, status = status.as_u16(), "NetBox request failed");

        match status.as_u16() {
            401 | 403 => Err(Error::remote(
                operation,
                format!(
                    "Authentication failed: Invalid API token or insufficient permissions. Status: {}",
                    status
                ),
            )),
            404 => Err(Error::not_found(format!("{}: {}", operation, error_text))),
            429 => Err(Error::remote(
                operation,
                format!("Rate limit exceeded. Please retry later. Status: {}", status),
            )),
            500..=599 => Err(Error::remote(
                operation,
                format!("NetBox server error (transient): {} - {}", status, error_text),
            )),
            _ => Err(Error::remote(
                operation,
                format!("{} - {}", status, error_text),
            )),
        }
    }

    async fn json<T: DeserializeOwned>(operation: &str, response: reqwest::Response) -> Result<T> {
        response
            .json()
            .await
            .map_err(|e| Error::remote(operation, format!("Failed to parse response: {}", e)))
    }

    /// Fetch every page of a list endpoint
    ///
    /// ```http
    /// GET /api/plugins/netbox-dns/<path>/?<query>
    /// Authorization: Token <token>
    /// ```
    ///
    /// Later pages are fetched from the `next` URL the server returns.
    async fn list<T: DeserializeOwned>(
        &self,
        operation: &str,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>> {
        let mut results = Vec::new();
        let first = self.request(reqwest::Method::GET, &self.endpoint(path)).query(query);
        let mut page: Page<T> = Self::json(operation, self.send(operation, first).await?).await?;

        loop {
            results.append(&mut page.results);
            let Some(next) = page.next.take() else {
                break;
            };
            tracing::debug!(operation, next = %next, "fetching next page");
            let request = self.request(reqwest::Method::GET, &next);
            page = Self::json(operation, self.send(operation, request).await?).await?;
        }

        Ok(results)
    }
}

#[async_trait]
impl RecordStore for NetboxClient {
    async fn get_view(&self, name: &str) -> Result<Option<RemoteView>> {
        let views: Vec<WireView> = self
            .list("get_view", "views/", &[("name", name.to_string())])
            .await?;

        // The name filter is a lookup, not an exact match on every version
        Ok(views
            .into_iter()
            .find(|v| v.name == name)
            .map(|v| RemoteView {
                id: v.id,
                name: v.name,
            }))
    }

    async fn get_zone(&self, name: &str, view: &ViewFilter) -> Result<Option<RemoteZone>> {
        let mut query = vec![("name", name.to_string())];
        match view {
            ViewFilter::Any => {}
            ViewFilter::Unassigned => query.push(("view", "null".to_string())),
            ViewFilter::Id(id) => query.push(("view_id", id.to_string())),
        }

        let zones: Vec<WireZone> = self.list("get_zone", "zones/", &query).await?;
        let mut matches = zones.into_iter().filter(|z| z.name == name);
        let found = matches.next();
        if matches.next().is_some() {
            return Err(Error::remote(
                "get_zone",
                format!("more than one zone named {} ({})", name, view),
            ));
        }

        tracing::debug!(zone = %name, view = %view, found = found.is_some(), "zone lookup");
        Ok(found.map(|z| RemoteZone {
            id: z.id,
            name: z.name,
            default_ttl: z.default_ttl,
            soa_refresh: z.soa_refresh,
        }))
    }

    async fn filter_records(&self, query: &RecordQuery) -> Result<Vec<RemoteRecord>> {
        let mut params = vec![("zone_id", query.zone_id.to_string())];
        if let Some(name) = &query.name {
            params.push(("name", name.clone()));
        }
        if let Some(record_type) = query.record_type {
            params.push(("type", record_type.to_string()));
        }
        if let Some(status) = query.status {
            params.push(("status", status.as_str().to_string()));
        }

        let records: Vec<WireRecord> = self.list("filter_records", "records/", &params).await?;
        // Server-side name filters may be case-insensitive
        Ok(records
            .into_iter()
            .map(RemoteRecord::from)
            .filter(|r| query.matches(r))
            .collect())
    }

    /// ```http
    /// POST /api/plugins/netbox-dns/records/
    /// {"zone": 1, "name": "www", "type": "A", "ttl": 300, "value": "192.0.2.1", "disable_ptr": true}
    /// ```
    async fn create_record(&self, record: &NewRecord) -> Result<RemoteRecord> {
        let request = self
            .request(reqwest::Method::POST, &self.endpoint("records/"))
            .json(record);
        let response = self.send("create_record", request).await?;
        let created: WireRecord = Self::json("create_record", response).await?;

        tracing::info!(
            id = created.id,
            name = %created.name,
            record_type = %created.record_type,
            "created NetBox record"
        );
        Ok(created.into())
    }

    async fn delete_record(&self, record_id: u64) -> Result<()> {
        let url = self.endpoint(&format!("records/{}/", record_id));
        self.send("delete_record", self.request(reqwest::Method::DELETE, &url))
            .await?;
        tracing::info!(id = record_id, "deleted NetBox record");
        Ok(())
    }

    async fn update_record_ttl(&self, record_id: u64, ttl: u32) -> Result<()> {
        let url = self.endpoint(&format!("records/{}/", record_id));
        let request = self
            .request(reqwest::Method::PATCH, &url)
            .json(&serde_json::json!({ "ttl": ttl }));
        self.send("update_record_ttl", request).await?;
        tracing::info!(id = record_id, ttl, "updated NetBox record TTL");
        Ok(())
    }

    fn store_name(&self) -> &'static str {
        "netbox"
    }
}
