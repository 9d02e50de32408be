//! Error types for the store.

use catalog_types::EntityId;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Entity not found.
    #[error("entity not found: {0}")]
    NotFound(EntityId),

    /// The id was hard-deleted earlier in this session.
    #[error("entity {0} was deleted and cannot be re-added")]
    Tombstoned(EntityId),

    /// Invalid data.
    #[error("invalid data: {0}")]
    InvalidData(#[from] catalog_types::Error),
}
