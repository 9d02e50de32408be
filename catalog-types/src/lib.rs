//! Core type definitions for the catalog lifecycle manager.
//!
//! This crate defines the types shared by the store and the lifecycle
//! coordinators:
//! - [`EntityId`]: opaque identifier of a catalog entity
//! - [`CatalogEntity`]: the lifecycle-relevant projection of an entity
//! - [`DeletionOutcome`] and [`FailureReason`]: per-entity delete results
//! - [`BulkOperationResult`]: ordered per-item outcomes plus derived counts
//!
//! Domain fields beyond identity, the active flag and the dependent count
//! belong to the catalog service, not here.

mod entity;
mod ids;
mod outcome;

pub use entity::CatalogEntity;
pub use ids::EntityId;
pub use outcome::{BulkCounts, BulkOperationResult, DeletionOutcome, FailureReason};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("entity id must not be empty")]
    EmptyId,

    #[error("entity name must not be empty")]
    EmptyName,
}
