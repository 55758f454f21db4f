// # Record Store Trait
//
// Defines the interface to the remote store that holds the DNS records
// (NetBox with the DNS plugin).
//
// ## Implementations
//
// - NetBox REST API: `netbox-dns-client` crate
// - In-memory: `netbox_dns_core::store::MemoryRecordStore`
//
// ## Usage
//
// ```rust,ignore
// use netbox_dns_core::traits::{RecordQuery, RecordStatus, RecordStore, ViewFilter};
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let store = /* RecordStore implementation */;
//
//     let zone = store.get_zone("example.com", &ViewFilter::Any).await?;
//     if let Some(zone) = zone {
//         let query = RecordQuery::zone(zone.id).with_status(RecordStatus::Active);
//         for record in store.filter_records(&query).await? {
//             println!("{} {} {}", record.name, record.record_type, record.value);
//         }
//     }
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::RecordType;

/// Lifecycle status of a remote record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    Active,
    Inactive,
}

impl RecordStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordStatus::Active => "active",
            RecordStatus::Inactive => "inactive",
        }
    }
}

/// A DNS view (namespace partition) in the remote store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteView {
    pub id: u64,
    pub name: String,
}

/// Which zones a lookup may match, by view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewFilter {
    /// No view filter
    Any,
    /// Only zones that are not assigned to a view
    Unassigned,
    /// Only zones in the view with this ID
    Id(u64),
}

impl fmt::Display for ViewFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewFilter::Any => f.write_str("any"),
            ViewFilter::Unassigned => f.write_str("null"),
            ViewFilter::Id(id) => write!(f, "view_id={}", id),
        }
    }
}

/// A zone as stored remotely
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteZone {
    pub id: u64,
    /// Zone name without trailing dot, as NetBox stores it
    pub name: String,
    pub default_ttl: Option<u32>,
    pub soa_refresh: Option<u32>,
}

/// A record as stored remotely
///
/// `record_type` is kept as the raw mnemonic: the store may hold types this
/// crate cannot decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRecord {
    pub id: u64,
    pub zone_id: u64,
    /// Owner name relative to the zone; `@` is the apex
    pub name: String,
    pub record_type: String,
    /// Record data in presentation format; `@` stands for the zone name
    pub value: String,
    pub ttl: Option<u32>,
    pub status: RecordStatus,
}

/// Payload for creating a record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewRecord {
    #[serde(rename = "zone")]
    pub zone_id: u64,
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: RecordType,
    pub ttl: u32,
    pub value: String,
    /// Suppress automatic PTR generation on the remote side
    pub disable_ptr: bool,
}

/// Filter for [`RecordStore::filter_records`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordQuery {
    pub zone_id: u64,
    pub name: Option<String>,
    pub record_type: Option<RecordType>,
    pub status: Option<RecordStatus>,
}

impl RecordQuery {
    /// All records of a zone
    pub fn zone(zone_id: u64) -> Self {
        Self {
            zone_id,
            name: None,
            record_type: None,
            status: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_type(mut self, record_type: RecordType) -> Self {
        self.record_type = Some(record_type);
        self
    }

    pub fn with_status(mut self, status: RecordStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Whether a record satisfies this filter
    pub fn matches(&self, record: &RemoteRecord) -> bool {
        record.zone_id == self.zone_id
            && self.name.as_ref().is_none_or(|name| *name == record.name)
            && self
                .record_type
                .is_none_or(|t| t.as_str().eq_ignore_ascii_case(&record.record_type))
            && self.status.is_none_or(|status| status == record.status)
    }
}

/// Trait for remote record store implementations
///
/// Every method is a single remote call. Implementations do not retry, back
/// off, or cache; callers own those policies.
///
/// Lookups that find nothing return `Ok(None)`; `Err` is reserved for failed
/// calls.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Look up a view by name
    async fn get_view(&self, name: &str) -> Result<Option<RemoteView>, crate::Error>;

    /// Look up a zone by name (without trailing dot) within a view filter
    async fn get_zone(
        &self,
        name: &str,
        view: &ViewFilter,
    ) -> Result<Option<RemoteZone>, crate::Error>;

    /// List the records matching `query`, in the store's order
    async fn filter_records(&self, query: &RecordQuery)
    -> Result<Vec<RemoteRecord>, crate::Error>;

    /// Create a record and return it as stored
    async fn create_record(&self, record: &NewRecord) -> Result<RemoteRecord, crate::Error>;

    /// Delete a record by ID
    async fn delete_record(&self, record_id: u64) -> Result<(), crate::Error>;

    /// Change only the TTL of a record
    async fn update_record_ttl(&self, record_id: u64, ttl: u32) -> Result<(), crate::Error>;

    /// Store name (for logging/debugging)
    fn store_name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, record_type: &str, status: RecordStatus) -> RemoteRecord {
        RemoteRecord {
            id: 1,
            zone_id: 7,
            name: name.to_string(),
            record_type: record_type.to_string(),
            value: "192.0.2.1".to_string(),
            ttl: None,
            status,
        }
    }

    #[test]
    fn test_query_matching() {
        let query = RecordQuery::zone(7)
            .with_name("www")
            .with_type(RecordType::A)
            .with_status(RecordStatus::Active);

        assert!(query.matches(&record("www", "A", RecordStatus::Active)));
        assert!(!query.matches(&record("www", "A", RecordStatus::Inactive)));
        assert!(!query.matches(&record("ftp", "A", RecordStatus::Active)));
        assert!(!query.matches(&record("www", "AAAA", RecordStatus::Active)));
        assert!(RecordQuery::zone(7).matches(&record("x", "BOGUS", RecordStatus::Inactive)));
        assert!(!RecordQuery::zone(8).matches(&record("www", "A", RecordStatus::Active)));
    }

    #[test]
    fn test_new_record_payload() {
        let record = NewRecord {
            zone_id: 3,
            name: "@".to_string(),
            record_type: RecordType::Mx,
            ttl: 300,
            value: "10 mail.example.com.".to_string(),
            disable_ptr: true,
        };
        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            serde_json::json!({
                "zone": 3,
                "name": "@",
                "type": "MX",
                "ttl": 300,
                "value": "10 mail.example.com.",
                "disable_ptr": true
            })
        );
    }

    #[test]
    fn test_view_filter_display() {
        assert_eq!(ViewFilter::Any.to_string(), "any");
        assert_eq!(ViewFilter::Unassigned.to_string(), "null");
        assert_eq!(ViewFilter::Id(4).to_string(), "view_id=4");
    }
}
