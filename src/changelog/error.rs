//! Change-log error types.

use crate::core::ReferenceKeyError;
use thiserror::Error;

/// Errors raised by change-log scopes and stores.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// Note exceeds the configured column size
    #[error("Note is {len} bytes, limit is {limit}")]
    NoteTooLong { len: usize, limit: usize },

    /// Serialization to JSON or binary format failed
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    /// Deserialization from JSON or binary format failed
    #[error("Deserialization failed: {0}")]
    DeserializationFailed(String),

    /// Snapshot version is not supported by this version
    #[error("Unsupported snapshot version {found}, supported: {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// Failure reported by an external storage backend
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Errors raised when querying the change log for an entity.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error(transparent)]
    Reference(#[from] ReferenceKeyError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
