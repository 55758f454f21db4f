//! Change applicator
//!
//! Applies planned changes to the remote store with as few mutations as
//! possible. Records are matched on their decoded value, not on the whole
//! record:
//!
//! - **Create**: one remote record per distinct value.
//! - **Delete**: remote records under `(name, type)` whose value belongs to
//!   the deleted record. Anything else under that key is left alone.
//! - **Update**: the existing and new value sets are split three ways.
//!   Values only in the existing set are deleted, values in both keep their
//!   remote record and only get the new TTL, and values only in the new set
//!   are created. Deletions and TTL updates finish before any creation.
//!
//! ```text
//!   existing ─┬─ existing − new ──► delete_record
//!             └─ existing ∩ new ──► update_record_ttl
//!   new ─────── new − existing ──► create_record
//! ```
//!
//! Remote values are decoded with the same translator that populated the
//! zone, so `2001:DB8:0:0::1` and `2001:db8::1` are one value, as are a
//! relative target and its absolute form when names are made absolute.

use tracing::{debug, info, warn};

use crate::error::Result;
use crate::model::{APEX, CanonicalRecord, Change, DecodedValue, RecordType};
use crate::traits::{NewRecord, RecordQuery, RecordStore, RemoteRecord, RemoteZone};
use crate::translator::RecordTranslator;

/// Mutation counts of one apply run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplySummary {
    pub created: usize,
    pub deleted: usize,
    pub ttl_updated: usize,
}

impl ApplySummary {
    pub fn total(&self) -> usize {
        self.created + self.deleted + self.ttl_updated
    }
}

/// Applies changes to one resolved zone
pub struct ChangeApplicator<'a> {
    store: &'a dyn RecordStore,
    zone: &'a RemoteZone,
    translator: RecordTranslator,
}

impl<'a> ChangeApplicator<'a> {
    /// `translator` must be the one the changes were decoded with
    pub fn new(
        store: &'a dyn RecordStore,
        zone: &'a RemoteZone,
        translator: RecordTranslator,
    ) -> Self {
        Self {
            store,
            zone,
            translator,
        }
    }

    /// Apply `changes` in order
    ///
    /// The first failing remote call aborts the run; mutations issued before
    /// it stay in place.
    pub async fn apply(&self, changes: &[Change]) -> Result<ApplySummary> {
        let mut summary = ApplySummary::default();

        for change in changes {
            let record = change.record();
            debug!(
                zone = %self.zone.name,
                kind = change.kind(),
                name = %record.name,
                record_type = %record.record_type,
                "applying change"
            );

            match change {
                Change::Create { new } => self.create(new, &mut summary).await?,
                Change::Delete { existing } => self.delete(existing, &mut summary).await?,
                Change::Update { existing, new } => {
                    self.update(existing, new, &mut summary).await?
                }
            }
        }

        info!(
            zone = %self.zone.name,
            changes = changes.len(),
            created = summary.created,
            deleted = summary.deleted,
            ttl_updated = summary.ttl_updated,
            "applied changes"
        );
        Ok(summary)
    }

    async fn create(&self, new: &CanonicalRecord, summary: &mut ApplySummary) -> Result<()> {
        for value in new.raw_values()? {
            self.create_value(new, value, summary).await?;
        }
        Ok(())
    }

    async fn delete(&self, existing: &CanonicalRecord, summary: &mut ApplySummary) -> Result<()> {
        let values = existing.distinct_values()?;
        let remote_records = self.fetch(existing).await?;

        for remote in &remote_records {
            if let Some(value) = self.remote_value(remote, existing.record_type)
                && values.contains(&&value)
            {
                self.delete_remote(remote, summary).await?;
            }
        }
        Ok(())
    }

    async fn update(
        &self,
        existing: &CanonicalRecord,
        new: &CanonicalRecord,
        summary: &mut ApplySummary,
    ) -> Result<()> {
        let existing_values = existing.distinct_values()?;
        let new_values = new.distinct_values()?;
        let remote_records = self.fetch(existing).await?;

        for remote in &remote_records {
            let Some(value) = self.remote_value(remote, existing.record_type) else {
                continue;
            };
            if !existing_values.contains(&&value) {
                continue;
            }
            if new_values.contains(&&value) {
                debug!(id = remote.id, value = %remote.value, ttl = new.ttl, "updating TTL");
                self.store.update_record_ttl(remote.id, new.ttl).await?;
                summary.ttl_updated += 1;
            } else {
                self.delete_remote(remote, summary).await?;
            }
        }

        for value in new_values {
            if !existing_values.contains(&value) {
                self.create_value(new, value.to_string(), summary).await?;
            }
        }
        Ok(())
    }

    /// Remote records stored under the record's `(name, type)`
    async fn fetch(&self, record: &CanonicalRecord) -> Result<Vec<RemoteRecord>> {
        let query = RecordQuery::zone(self.zone.id)
            .with_name(record.remote_name())
            .with_type(record.record_type);
        self.store.filter_records(&query).await
    }

    /// A remote record's decoded value, `@` standing for the zone name
    ///
    /// A value that does not decode matches nothing and is left in place.
    fn remote_value(&self, remote: &RemoteRecord, record_type: RecordType) -> Option<DecodedValue> {
        let raw = if remote.value == APEX {
            self.zone.name.as_str()
        } else {
            remote.value.as_str()
        };
        match self.translator.decode(&remote.name, record_type, raw) {
            Ok(value) => value,
            Err(e) => {
                warn!(id = remote.id, error = %e, "remote value does not decode, leaving it alone");
                None
            }
        }
    }

    async fn create_value(
        &self,
        record: &CanonicalRecord,
        value: String,
        summary: &mut ApplySummary,
    ) -> Result<()> {
        let payload = NewRecord {
            zone_id: self.zone.id,
            name: record.remote_name().to_string(),
            record_type: record.record_type,
            ttl: record.ttl,
            value,
            disable_ptr: true,
        };
        let created = self.store.create_record(&payload).await?;
        debug!(
            id = created.id,
            name = %created.name,
            record_type = %created.record_type,
            value = %created.value,
            "created record"
        );
        summary.created += 1;
        Ok(())
    }

    async fn delete_remote(&self, remote: &RemoteRecord, summary: &mut ApplySummary) -> Result<()> {
        debug!(
            id = remote.id,
            name = %remote.name,
            record_type = %remote.record_type,
            value = %remote.value,
            "deleting record"
        );
        self.store.delete_record(remote.id).await?;
        summary.deleted += 1;
        Ok(())
    }
}
