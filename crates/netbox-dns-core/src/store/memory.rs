// # Memory Record Store
//
// In-memory implementation of RecordStore.
//
// ## Purpose
//
// Mirrors the parts of the NetBox DNS data model the translator and the
// applicator touch: views, zones and records with numeric IDs. Nothing is
// persisted.
//
// ## When to Use
//
// - Tests
// - Dry runs: apply a change set against a snapshot and inspect the result

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::Error;
use crate::traits::record_store::{
    NewRecord, RecordQuery, RecordStatus, RecordStore, RemoteRecord, RemoteView, RemoteZone,
    ViewFilter,
};

#[derive(Debug, Default)]
struct Inner {
    views: Vec<RemoteView>,
    /// Zones with the ID of the view they belong to
    zones: Vec<(RemoteZone, Option<u64>)>,
    records: Vec<RemoteRecord>,
    last_id: u64,
}

impl Inner {
    fn next_id(&mut self) -> u64 {
        self.last_id += 1;
        self.last_id
    }
}

/// In-memory record store implementation
///
/// # Example
///
/// ```rust,no_run
/// use netbox_dns_core::store::MemoryRecordStore;
/// use netbox_dns_core::traits::{RecordStore, ViewFilter};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = MemoryRecordStore::new();
///     let zone = store.add_zone("example.com", None, Some(3600), Some(86400)).await;
///     store.add_record(zone.id, "www", "A", "192.0.2.1", None).await;
///
///     let found = store.get_zone("example.com", &ViewFilter::Any).await?;
///     assert_eq!(found.map(|z| z.id), Some(zone.id));
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryRecordStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryRecordStore {
    /// Create a new empty memory record store
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a view
    pub async fn add_view(&self, name: &str) -> RemoteView {
        let mut guard = self.inner.write().await;
        let view = RemoteView {
            id: guard.next_id(),
            name: name.to_string(),
        };
        guard.views.push(view.clone());
        view
    }

    /// Add a zone, optionally inside a view
    pub async fn add_zone(
        &self,
        name: &str,
        view_id: Option<u64>,
        default_ttl: Option<u32>,
        soa_refresh: Option<u32>,
    ) -> RemoteZone {
        let mut guard = self.inner.write().await;
        let zone = RemoteZone {
            id: guard.next_id(),
            name: name.to_string(),
            default_ttl,
            soa_refresh,
        };
        guard.zones.push((zone.clone(), view_id));
        zone
    }

    /// Add an active record
    pub async fn add_record(
        &self,
        zone_id: u64,
        name: &str,
        record_type: &str,
        value: &str,
        ttl: Option<u32>,
    ) -> RemoteRecord {
        self.insert(zone_id, name, record_type, value, ttl, RecordStatus::Active)
            .await
    }

    /// Add a record with an explicit status
    pub async fn insert(
        &self,
        zone_id: u64,
        name: &str,
        record_type: &str,
        value: &str,
        ttl: Option<u32>,
        status: RecordStatus,
    ) -> RemoteRecord {
        let mut guard = self.inner.write().await;
        let record = RemoteRecord {
            id: guard.next_id(),
            zone_id,
            name: name.to_string(),
            record_type: record_type.to_string(),
            value: value.to_string(),
            ttl,
            status,
        };
        guard.records.push(record.clone());
        record
    }

    /// Snapshot of all records of a zone
    pub async fn records(&self, zone_id: u64) -> Vec<RemoteRecord> {
        let guard = self.inner.read().await;
        guard
            .records
            .iter()
            .filter(|r| r.zone_id == zone_id)
            .cloned()
            .collect()
    }

    /// Get the number of records in the store
    pub async fn len(&self) -> usize {
        self.inner.read().await.records.len()
    }

    /// Check if the store holds no records
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.records.is_empty()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn get_view(&self, name: &str) -> Result<Option<RemoteView>, Error> {
        let guard = self.inner.read().await;
        Ok(guard.views.iter().find(|v| v.name == name).cloned())
    }

    async fn get_zone(&self, name: &str, view: &ViewFilter) -> Result<Option<RemoteZone>, Error> {
        let guard = self.inner.read().await;
        let mut matches = guard.zones.iter().filter(|(zone, view_id)| {
            zone.name == name
                && match view {
                    ViewFilter::Any => true,
                    ViewFilter::Unassigned => view_id.is_none(),
                    ViewFilter::Id(id) => *view_id == Some(*id),
                }
        });

        let found = matches.next().map(|(zone, _)| zone.clone());
        if matches.next().is_some() {
            return Err(Error::remote(
                "get_zone",
                format!("more than one zone named {} ({})", name, view),
            ));
        }
        Ok(found)
    }

    async fn filter_records(&self, query: &RecordQuery) -> Result<Vec<RemoteRecord>, Error> {
        let guard = self.inner.read().await;
        Ok(guard
            .records
            .iter()
            .filter(|r| query.matches(r))
            .cloned()
            .collect())
    }

    async fn create_record(&self, record: &NewRecord) -> Result<RemoteRecord, Error> {
        let mut guard = self.inner.write().await;
        if !guard.zones.iter().any(|(zone, _)| zone.id == record.zone_id) {
            return Err(Error::remote(
                "create_record",
                format!("zone {} does not exist", record.zone_id),
            ));
        }

        let created = RemoteRecord {
            id: guard.next_id(),
            zone_id: record.zone_id,
            name: record.name.clone(),
            record_type: record.record_type.as_str().to_string(),
            value: record.value.clone(),
            ttl: Some(record.ttl),
            status: RecordStatus::Active,
        };
        guard.records.push(created.clone());
        Ok(created)
    }

    async fn delete_record(&self, record_id: u64) -> Result<(), Error> {
        let mut guard = self.inner.write().await;
        let before = guard.records.len();
        guard.records.retain(|r| r.id != record_id);
        if guard.records.len() == before {
            return Err(Error::remote(
                "delete_record",
                format!("record {} does not exist", record_id),
            ));
        }
        Ok(())
    }

    async fn update_record_ttl(&self, record_id: u64, ttl: u32) -> Result<(), Error> {
        let mut guard = self.inner.write().await;
        let record = guard
            .records
            .iter_mut()
            .find(|r| r.id == record_id)
            .ok_or_else(|| {
                Error::remote(
                    "update_record_ttl",
                    format!("record {} does not exist", record_id),
                )
            })?;
        record.ttl = Some(ttl);
        Ok(())
    }

    fn store_name(&self) -> &'static str {
        "memory"
    }
}
