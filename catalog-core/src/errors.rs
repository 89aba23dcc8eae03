//! Unified error type for catalog operations.

use thiserror::Error;

/// Top-level error for `catalog-core` operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Referenced entry does not exist.
    #[error("unknown catalog entry: {0}")]
    UnknownEntry(i64),

    /// Referenced metadata option does not exist.
    #[error("unknown metadata option: {0}")]
    UnknownOption(i64),

    /// Referenced metadata type does not exist.
    #[error("unknown metadata type: {0}")]
    UnknownType(i64),

    /// `(type, value)` uniqueness violated on option insert.
    #[error("duplicate option value {value:?} for metadata type {type_id}")]
    DuplicateOptionValue { type_id: i64, value: String },

    /// I/O or filesystem errors (seed loading).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing / serialization errors.
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
