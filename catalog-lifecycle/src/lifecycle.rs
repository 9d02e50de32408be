use catalog_store::{EntityStore, SnapshotStats};
use catalog_types::{BulkOperationResult, DeletionOutcome, EntityId};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

use crate::bulk::{BulkOperationCoordinator, ItemSettled};
use crate::classifier::HeuristicClassifier;
use crate::config::LifecycleConfig;
use crate::deletion::DeletionCoordinator;
use crate::error::LifecycleResult;
use crate::http::HttpCatalogTransport;
use crate::loader::CatalogLoader;
use crate::policy::{AccessPolicy, AllowAllPolicy};
use crate::toggle::StatusToggle;
use crate::transport::CatalogTransport;

/// One store plus every coordinator, wired from a [`LifecycleConfig`].
pub struct CatalogLifecycle {
    store: Arc<EntityStore>,
    loader: CatalogLoader,
    deletion: Arc<DeletionCoordinator>,
    toggle: StatusToggle,
    bulk: BulkOperationCoordinator,
}

impl CatalogLifecycle {
    /// Wires everything over `transport` with `AllowAllPolicy`.
    pub fn new(config: &LifecycleConfig, transport: Arc<dyn CatalogTransport>) -> Self {
        Self::with_policy(config, transport, Arc::new(AllowAllPolicy))
    }

    pub fn with_policy(
        config: &LifecycleConfig,
        transport: Arc<dyn CatalogTransport>,
        policy: Arc<dyn AccessPolicy>,
    ) -> Self {
        let store = Arc::new(EntityStore::new());
        let classifier = Arc::new(HeuristicClassifier::new(config.conflicts.clone()));

        let deletion = Arc::new(
            DeletionCoordinator::new(store.clone(), transport.clone())
                .with_classifier(classifier)
                .with_policy(policy.clone())
                .with_mode(config.deletion.mode),
        );
        let bulk = BulkOperationCoordinator::new(deletion.clone())
            .with_max_concurrency(config.bulk.max_concurrency);
        let toggle = StatusToggle::new(store.clone(), transport.clone()).with_policy(policy.clone());
        let loader = CatalogLoader::new(store.clone(), transport).with_policy(policy);

        Self {
            store,
            loader,
            deletion,
            toggle,
            bulk,
        }
    }

    /// Wires everything over an [`HttpCatalogTransport`] built from `config.service`.
    pub fn connect(config: &LifecycleConfig) -> LifecycleResult<Self> {
        let transport = HttpCatalogTransport::new(&config.service)?;
        Ok(Self::new(config, Arc::new(transport)))
    }

    pub fn store(&self) -> &Arc<EntityStore> {
        &self.store
    }

    pub async fn refresh(&self) -> LifecycleResult<SnapshotStats> {
        self.loader.refresh().await
    }

    pub async fn delete(&self, id: &EntityId) -> LifecycleResult<DeletionOutcome> {
        self.deletion.delete(id).await
    }

    pub async fn toggle(&self, id: &EntityId) -> LifecycleResult<bool> {
        self.toggle.toggle(id).await
    }

    pub async fn set_active(&self, id: &EntityId, active: bool) -> LifecycleResult<bool> {
        self.toggle.set_active(id, active).await
    }

    pub async fn bulk_delete(&self, ids: &[EntityId]) -> LifecycleResult<BulkOperationResult> {
        self.bulk.run(ids).await
    }

    pub async fn bulk_delete_with_progress(
        &self,
        ids: &[EntityId],
        progress: UnboundedSender<ItemSettled>,
    ) -> LifecycleResult<BulkOperationResult> {
        self.bulk.run_with_progress(ids, progress).await
    }
}
