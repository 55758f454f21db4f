//! Error types for NetBox DNS synchronisation
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for NetBox DNS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for NetBox DNS synchronisation
#[derive(Error, Debug)]
pub enum Error {
    /// Zone is absent from the remote store for the configured view
    #[error("Zone not found: {zone} (view: {view})")]
    ZoneNotFound {
        /// Zone name as requested
        zone: String,
        /// Human-readable view filter
        view: String,
    },

    /// Configured view name could not be resolved
    #[error("DNS view not found: {0}")]
    ViewNotFound(String),

    /// Unsupported or malformed record type/value
    #[error("Cannot decode {record_type} record '{name}' with value '{value}': {reason}")]
    Decode {
        /// Record owner name
        name: String,
        /// Record type as reported by the remote store
        record_type: String,
        /// Offending raw value
        value: String,
        /// What went wrong
        reason: String,
    },

    /// A create/delete/update/lookup call against the remote store failed
    #[error("Remote call '{operation}' failed: {message}")]
    Remote {
        /// Name of the remote operation
        operation: String,
        /// Error message
        message: String,
    },

    /// Requested object does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// A record with the same name and type is already in the zone
    #[error("Duplicate {record_type} record '{name}' in zone {zone}")]
    DuplicateRecord {
        /// Zone name
        zone: String,
        /// Record owner name
        name: String,
        /// Record type
        record_type: String,
    },

    /// A change record carries no values
    #[error("Change for {record_type} record '{name}' has no values")]
    MalformedChange {
        /// Record owner name
        name: String,
        /// Record type
        record_type: String,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP transport errors
    #[error("HTTP error: {0}")]
    Http(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a "zone not found" error
    pub fn zone_not_found(zone: impl Into<String>, view: impl Into<String>) -> Self {
        Self::ZoneNotFound {
            zone: zone.into(),
            view: view.into(),
        }
    }

    /// Create a "view not found" error
    pub fn view_not_found(view: impl Into<String>) -> Self {
        Self::ViewNotFound(view.into())
    }

    /// Create a decode error
    pub fn decode(
        name: impl Into<String>,
        record_type: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Decode {
            name: name.into(),
            record_type: record_type.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a remote call error
    pub fn remote(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Remote {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Whether the error is fatal for the whole zone operation
    /// rather than for a single remote call.
    pub fn is_lookup_failure(&self) -> bool {
        matches!(self, Self::ZoneNotFound { .. } | Self::ViewNotFound(_))
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
