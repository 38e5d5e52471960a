//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    /// Durable storage could not be read or written.
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    /// User input rejected before reaching the store.
    #[error("{0}")]
    Validation(String),

    #[error("Category suggestion failed: {0}")]
    Suggestion(String),

    /// A suggestion request is already in flight.
    #[error("A category suggestion is already pending")]
    Busy,

    /// The user backed out of a prompt.
    #[error("Cancelled")]
    Cancelled,

    #[error("UI error: {0}")]
    Ui(String),

    #[error("Export failed: {0}")]
    Export(String),
}
