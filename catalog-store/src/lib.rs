//! In-memory lifecycle projection for catalog entities.
//!
//! [`EntityStore`] is the single writable source of truth for lifecycle state
//! within a session. Coordinators never write entity fields directly; they
//! compute a [`DeletionOutcome`](catalog_types::DeletionOutcome) and hand it
//! to [`EntityStore::apply_outcome`].
//!
//! # Architecture
//!
//! - Entities are kept in a map keyed by id, so updates are targeted and
//!   concurrent per-id writes never race with a whole-list replacement
//! - Hard-deleted ids are tombstoned and can never be re-added
//! - Catalog refreshes are merged entry by entry instead of swapping the map

mod entity_store;
mod error;

pub use entity_store::{EntityStore, SnapshotStats, StatusFilter};
pub use error::{StoreError, StoreResult};
