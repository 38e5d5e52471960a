//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters.

use crate::domain::{Category, DomainError};

/// Durable key-value storage. Values are opaque text; callers own the format.
#[async_trait::async_trait]
pub trait StoragePort: Send + Sync {
    /// Read the value stored under `key`. Returns `None` if the key was never written.
    async fn get(&self, key: &str) -> Result<Option<String>, DomainError>;

    /// Overwrite the value stored under `key`.
    async fn set(&self, key: &str, value: &str) -> Result<(), DomainError>;
}

/// Maps free text to exactly one category. Best-effort: callers must tolerate failure.
#[async_trait::async_trait]
pub trait CategorySuggesterPort: Send + Sync {
    async fn suggest_category(&self, text: &str) -> Result<Category, DomainError>;
}
