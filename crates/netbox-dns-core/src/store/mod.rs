// # Record Store Implementations
//
// This module provides implementations of the RecordStore trait that live
// in the core crate. The NetBox REST client is in `netbox-dns-client`.

pub mod memory;

pub use memory::MemoryRecordStore;
