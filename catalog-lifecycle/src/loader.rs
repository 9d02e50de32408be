//! Populates the store from the catalog service.

use catalog_store::{EntityStore, SnapshotStats};
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::LifecycleResult;
use crate::policy::{AccessPolicy, AllowAllPolicy, Operation};
use crate::transport::CatalogTransport;

/// Fetches the entity list and dependent counts and merges them into the store.
///
/// Dependent counts are informational. If they cannot be fetched the refresh
/// still succeeds and the store keeps the counts reported by the listing.
pub struct CatalogLoader {
    store: Arc<EntityStore>,
    transport: Arc<dyn CatalogTransport>,
    policy: Arc<dyn AccessPolicy>,
}

impl CatalogLoader {
    pub fn new(store: Arc<EntityStore>, transport: Arc<dyn CatalogTransport>) -> Self {
        Self {
            store,
            transport,
            policy: Arc::new(AllowAllPolicy),
        }
    }

    pub fn with_policy(mut self, policy: Arc<dyn AccessPolicy>) -> Self {
        self.policy = policy;
        self
    }

    pub async fn refresh(&self) -> LifecycleResult<SnapshotStats> {
        self.policy.authorize(Operation::Refresh).await?;

        let entities = self.transport.list_entities().await?;
        let stats = self.store.merge_snapshot(entities).await;

        match self.transport.dependent_counts().await {
            Ok(counts) => self.store.set_dependent_counts(&counts).await,
            Err(e) => warn!("Could not fetch dependent counts, keeping listed values: {}", e),
        }

        info!(
            "Catalog refreshed: {} entities ({} new, {} removed)",
            self.store.len().await,
            stats.inserted,
            stats.removed
        );
        Ok(stats)
    }
}
