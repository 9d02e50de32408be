//! Direct status changes, independent of the delete phases.
//!
//! A toggle is not idempotent at the protocol level: retrying a toggle whose
//! first attempt succeeded flips the flag back. Callers that retry should
//! use [`StatusToggle::set_active`], which is a no-op when the flag already
//! has the requested value.

use catalog_store::EntityStore;
use catalog_types::{CatalogEntity, EntityId, FailureReason};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::classifier::extract_message;
use crate::error::{LifecycleError, LifecycleResult};
use crate::policy::{AccessPolicy, AllowAllPolicy, Operation};
use crate::transport::CatalogTransport;

/// Flips or sets the active flag through the catalog service.
pub struct StatusToggle {
    store: Arc<EntityStore>,
    transport: Arc<dyn CatalogTransport>,
    policy: Arc<dyn AccessPolicy>,
}

impl StatusToggle {
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

    /// Sets `active = !current` and returns the new value.
    pub async fn toggle(&self, id: &EntityId) -> LifecycleResult<bool> {
        self.policy.authorize(Operation::ToggleStatus).await?;
        let current = self.current(id).await?;
        let target = !current.active;
        self.send(current, target).await
    }

    /// Sets the flag to `active`, skipping the request if it already matches.
    pub async fn set_active(&self, id: &EntityId, active: bool) -> LifecycleResult<bool> {
        self.policy.authorize(Operation::ToggleStatus).await?;
        let current = self.current(id).await?;
        if current.active == active {
            debug!("Entity {} already has active={}, nothing to send", id, active);
            return Ok(active);
        }
        self.send(current, active).await
    }

    async fn current(&self, id: &EntityId) -> LifecycleResult<CatalogEntity> {
        self.store
            .get(id)
            .await
            .map_err(|_| LifecycleError::NotFound(id.clone()))
    }

    async fn send(&self, current: CatalogEntity, target: bool) -> LifecycleResult<bool> {
        let id = current.id.clone();
        let update = current.with_active(target);

        let response = self.transport.update_entity(&update).await.map_err(|e| {
            warn!("Status update for {} failed: {}", id, e);
            LifecycleError::Failed(e.failure_reason())
        })?;

        if !response.is_success() {
            let reason = if response.is_not_found() {
                FailureReason::RemoteNotFound
            } else {
                FailureReason::Server {
                    status: response.status,
                    message: extract_message(response.body.as_deref()),
                }
            };
            warn!("Status update for {} rejected: {}", id, reason);
            return Err(LifecycleError::Failed(reason));
        }

        self.store.apply_status(&id, target).await?;
        info!("Entity {} is now {}", id, if target { "active" } else { "inactive" });
        Ok(target)
    }
}
