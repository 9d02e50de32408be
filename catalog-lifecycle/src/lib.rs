//! Lifecycle management for catalog entities.
//!
//! Decides whether deleting an entity should deactivate it, remove it, or be
//! refused because other records still reference it, and applies that
//! decision to single entities and to whole selections.
//!
//! # Components
//!
//! - **Classifier**: interprets a refused hard delete as a dependency
//!   conflict or an unknown failure
//! - **Deletion**: the two-phase delete state machine for one entity
//! - **Toggle**: direct status changes, independent of deletion
//! - **Bulk**: fan-out over a selection with per-item isolation
//! - **Loader**: fills the store from the catalog service
//! - **Transport**: the seam to the catalog service (HTTP or mock)
//!
//! # Example
//!
//! ```
//! use catalog_lifecycle::{CatalogLifecycle, LifecycleConfig};
//! use catalog_lifecycle::transport::mock::MockTransport;
//! use std::sync::Arc;
//!
//! let lifecycle = CatalogLifecycle::new(
//!     &LifecycleConfig::default(),
//!     Arc::new(MockTransport::new()),
//! );
//! # let _ = lifecycle.store();
//! ```

pub mod bulk;
pub mod classifier;
mod config;
pub mod deletion;
mod error;
mod http;
mod lifecycle;
mod loader;
pub mod policy;
pub mod toggle;
pub mod transport;

pub use bulk::{BulkOperationCoordinator, ItemSettled, DEFAULT_MAX_CONCURRENCY};
pub use classifier::{
    extract_message, Classification, ConflictClassifier, ConflictPolicy, HeuristicClassifier,
};
pub use config::{BulkConfig, DeletionConfig, LifecycleConfig, ServiceConfig};
pub use deletion::{DeactivationMode, DeletionCoordinator};
pub use error::{ConfigError, LifecycleError, LifecycleResult, TransportError, TransportResult};
pub use http::HttpCatalogTransport;
pub use lifecycle::CatalogLifecycle;
pub use loader::CatalogLoader;
pub use policy::{AccessPolicy, AllowAllPolicy, Operation, PermissionSetPolicy};
pub use toggle::StatusToggle;
pub use transport::{CatalogTransport, ServiceResponse};
