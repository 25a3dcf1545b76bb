//! Error types for the bookkeeping domain

use thiserror::Error;

/// Result type for domain operations
pub type Result<T> = std::result::Result<T, Error>;

/// Domain errors
#[derive(Error, Debug)]
pub enum Error {
    /// A provider row failed validation
    #[error("Invalid {entity} record at row {row}: {reason}")]
    InvalidRecord {
        /// Entity being decoded (accounts, categories, ...)
        entity: &'static str,
        /// Zero-based row index in the provider payload
        row: usize,
        /// Validation failure
        reason: String,
    },

    /// Payload was not a list of rows
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
