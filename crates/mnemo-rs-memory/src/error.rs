//! Error types for memory operations.

/// Errors returned by memory stores, backends and sweeps.
#[derive(Debug, thiserror::Error)]
pub enum MemoryError {
    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization error.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    /// A record file could not be decoded into a record.
    #[error("malformed record at {location}: {reason}")]
    Malformed { location: String, reason: String },
    /// Record identifier is not a safe file stem.
    #[error("invalid record id: {0}")]
    InvalidId(String),
    /// Record type rejected by the schema catalog.
    #[error("unknown memory type: {0}")]
    UnknownType(String),
    /// Extension key names a content field it cannot set.
    #[error("content field `{0}` cannot be set as an extension")]
    ReservedField(String),
    /// Category name is not one of the record categories.
    #[error("unknown category: {0}")]
    UnknownCategory(String),
}
