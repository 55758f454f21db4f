//! Core traits for NetBox DNS synchronisation
//!
//! This module defines the abstract interface to the remote record store.
//!
//! - [`RecordStore`]: Read and mutate views, zones and records

pub mod record_store;

pub use record_store::{
    NewRecord, RecordQuery, RecordStatus, RecordStore, RemoteRecord, RemoteView, RemoteZone,
    ViewFilter,
};
