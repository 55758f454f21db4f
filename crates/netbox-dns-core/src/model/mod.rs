//! Provider-agnostic zone model
//!
//! - [`RecordType`]: record types with a decode rule
//! - [`DecodedValue`]: one decoded record value
//! - [`CanonicalRecord`] and [`Zone`]: records grouped by `(name, type)`
//! - [`Change`]: a planned create/update/delete

pub mod change;
pub mod record;
pub mod record_type;
pub mod value;

pub use change::{Change, ChangeSpec, RecordSpec};
pub use record::{APEX, CanonicalRecord, Zone};
pub use record_type::{RecordType, SUPPORTED_TYPES, UnknownRecordType};
pub use value::{
    CaaValue, DecodedValue, LocValue, MxValue, NaptrValue, SrvValue, SshfpValue,
};
