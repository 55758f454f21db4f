//! Planned changes, as handed over by the zone planner

use serde::Deserialize;

use super::record::CanonicalRecord;
use super::record_type::RecordType;

/// One classified change against a zone
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    Create { new: CanonicalRecord },
    Delete { existing: CanonicalRecord },
    Update {
        existing: CanonicalRecord,
        new: CanonicalRecord,
    },
}

impl Change {
    /// The record that identifies the change's `(name, type)`
    pub fn record(&self) -> &CanonicalRecord {
        match self {
            Change::Create { new } => new,
            Change::Delete { existing } | Change::Update { existing, .. } => existing,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Change::Create { .. } => "create",
            Change::Delete { .. } => "delete",
            Change::Update { .. } => "update",
        }
    }
}

/// A record as written in a change file, with raw NetBox values
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RecordSpec {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: RecordType,
    pub ttl: u32,
    pub values: Vec<String>,
}

/// A change as written in a change file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeSpec {
    Create(RecordSpec),
    Delete(RecordSpec),
    Update {
        existing: RecordSpec,
        new: RecordSpec,
    },
}
