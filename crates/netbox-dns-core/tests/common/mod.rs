//! Test doubles and common utilities for contract tests
//!
//! The recording store wraps a MemoryRecordStore and logs every mutating
//! call in the order it was issued.

#![allow(dead_code)]

use netbox_dns_core::error::{Error, Result};
use netbox_dns_core::store::MemoryRecordStore;
use netbox_dns_core::traits::{
    NewRecord, RecordQuery, RecordStore, RemoteRecord, RemoteView, RemoteZone, ViewFilter,
};
use netbox_dns_core::{NetboxDnsSource, SourceConfig};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// A mutating call seen by the recording store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Create {
        name: String,
        record_type: String,
        value: String,
        ttl: u32,
        disable_ptr: bool,
    },
    Delete {
        id: u64,
    },
    UpdateTtl {
        id: u64,
        ttl: u32,
    },
}

impl Call {
    pub fn is_create(&self) -> bool {
        matches!(self, Call::Create { .. })
    }
}

/// RecordStore that records mutations and read counts
#[derive(Clone)]
pub struct RecordingStore {
    inner: MemoryRecordStore,
    calls: Arc<Mutex<Vec<Call>>>,
    filter_call_count: Arc<AtomicUsize>,
    fail_creates: Arc<AtomicBool>,
}

impl RecordingStore {
    pub fn new(inner: MemoryRecordStore) -> Self {
        Self {
            inner,
            calls: Arc::new(Mutex::new(Vec::new())),
            filter_call_count: Arc::new(AtomicUsize::new(0)),
            fail_creates: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Mutations in issue order
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn create_count(&self) -> usize {
        self.calls().iter().filter(|c| c.is_create()).count()
    }

    pub fn delete_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Delete { .. }))
            .count()
    }

    pub fn update_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::UpdateTtl { .. }))
            .count()
    }

    pub fn filter_call_count(&self) -> usize {
        self.filter_call_count.load(Ordering::SeqCst)
    }

    /// Make every later create_record call fail
    pub fn fail_creates(&self) {
        self.fail_creates.store(true, Ordering::SeqCst);
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
        self.filter_call_count.store(0, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl RecordStore for RecordingStore {
    async fn get_view(&self, name: &str) -> Result<Option<RemoteView>> {
        self.inner.get_view(name).await
    }

    async fn get_zone(&self, name: &str, view: &ViewFilter) -> Result<Option<RemoteZone>> {
        self.inner.get_zone(name, view).await
    }

    async fn filter_records(&self, query: &RecordQuery) -> Result<Vec<RemoteRecord>> {
        self.filter_call_count.fetch_add(1, Ordering::SeqCst);
        self.inner.filter_records(query).await
    }

    async fn create_record(&self, record: &NewRecord) -> Result<RemoteRecord> {
        self.calls.lock().unwrap().push(Call::Create {
            name: record.name.clone(),
            record_type: record.record_type.to_string(),
            value: record.value.clone(),
            ttl: record.ttl,
            disable_ptr: record.disable_ptr,
        });
        if self.fail_creates.load(Ordering::SeqCst) {
            return Err(Error::remote("create_record", "simulated failure"));
        }
        self.inner.create_record(record).await
    }

    async fn delete_record(&self, record_id: u64) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Delete { id: record_id });
        self.inner.delete_record(record_id).await
    }

    async fn update_record_ttl(&self, record_id: u64, ttl: u32) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::UpdateTtl { id: record_id, ttl });
        self.inner.update_record_ttl(record_id, ttl).await
    }

    fn store_name(&self) -> &'static str {
        "recording"
    }
}

/// Minimal valid configuration
pub fn minimal_config() -> SourceConfig {
    SourceConfig::new("https://netbox.example.com", "test-token")
}

/// Build a source over a recording store sharing `store`'s records
pub async fn source_for(store: &MemoryRecordStore) -> (NetboxDnsSource, RecordingStore) {
    source_with_config(store, minimal_config()).await
}

pub async fn source_with_config(
    store: &MemoryRecordStore,
    config: SourceConfig,
) -> (NetboxDnsSource, RecordingStore) {
    let recording = RecordingStore::new(store.clone());
    let source = NetboxDnsSource::new(Box::new(recording.clone()), config)
        .await
        .expect("source construction succeeds");
    (source, recording)
}
