// # netbox-dns-core
//
// Core library for synchronising DNS zones with the NetBox DNS plugin.
//
// ## Architecture Overview
//
// - **RecordStore**: Trait for reading and mutating the remote record store
// - **RecordTranslator**: Turns remote records into canonical records
// - **ChangeApplicator**: Pushes create/delete/update changes back with as
//   few remote mutations as possible
// - **NetboxDnsSource**: Populate/apply facade for an orchestrator
// - **MemoryRecordStore**: In-memory RecordStore for tests and dry runs
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Translation and reconciliation know nothing
//    about HTTP; the REST client lives in `netbox-dns-client`
// 2. **Fail Whole Zones**: A record that cannot be decoded aborts the zone
// 3. **Minimal Mutation**: Unchanged values keep their remote record

pub mod applicator;
pub mod config;
pub mod error;
pub mod model;
pub mod rdata;
pub mod source;
pub mod store;
pub mod traits;
pub mod translator;

// Re-export core types for convenience
pub use applicator::{ApplySummary, ChangeApplicator};
pub use config::{SourceConfig, ViewSelector};
pub use error::{Error, Result};
pub use model::{CanonicalRecord, Change, ChangeSpec, DecodedValue, RecordType, Zone};
pub use source::NetboxDnsSource;
pub use store::MemoryRecordStore;
pub use traits::RecordStore;
pub use translator::{RecordTranslator, ZoneContext};
