//! Two-phase delete state machine.
//!
//! ```text
//! Active --delete--> Inactive --delete--> Deleted
//!                        |
//!                        +--delete (conflict)--> Inactive
//! ```
//!
//! Phase 1 only hides an active entity, so no referential check applies and
//! it never reports a conflict: a refusal the classifier reads as a conflict
//! still counts as deactivated. Phase 2 asks the service for a hard delete and
//! classifies refusals. The phase is chosen from the store's current state on
//! every call.

use catalog_store::EntityStore;
use catalog_types::{CatalogEntity, DeletionOutcome, EntityId, FailureReason};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::classifier::{extract_message, Classification, ConflictClassifier, HeuristicClassifier};
use crate::error::LifecycleResult;
use crate::policy::{AccessPolicy, AllowAllPolicy, Operation};
use crate::transport::{CatalogTransport, ServiceResponse};

/// How phase 1 asks the service to deactivate an entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeactivationMode {
    /// The service deactivates on `DELETE` of an active entity. A 2xx or a
    /// conflict answer counts as deactivated; any other answer is a failure.
    #[default]
    DeleteEndpoint,
    /// Deactivate with a `PUT` carrying `active = false`.
    UpdateEndpoint,
}

/// Runs the delete protocol for one entity at a time.
pub struct DeletionCoordinator {
    store: Arc<EntityStore>,
    transport: Arc<dyn CatalogTransport>,
    classifier: Arc<dyn ConflictClassifier>,
    policy: Arc<dyn AccessPolicy>,
    mode: DeactivationMode,
}

impl DeletionCoordinator {
    /// Creates a coordinator with the default classifier, `AllowAllPolicy`
    /// and `DeactivationMode::DeleteEndpoint`.
    pub fn new(store: Arc<EntityStore>, transport: Arc<dyn CatalogTransport>) -> Self {
        Self {
            store,
            transport,
            classifier: Arc::new(HeuristicClassifier::default()),
            policy: Arc::new(AllowAllPolicy),
            mode: DeactivationMode::default(),
        }
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn ConflictClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_policy(mut self, policy: Arc<dyn AccessPolicy>) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_mode(mut self, mode: DeactivationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn store(&self) -> &Arc<EntityStore> {
        &self.store
    }

    pub fn policy(&self) -> &Arc<dyn AccessPolicy> {
        &self.policy
    }

    pub fn mode(&self) -> DeactivationMode {
        self.mode
    }

    /// Deletes one entity and applies the outcome to the store.
    ///
    /// Only an authorization failure is returned as an error; every other
    /// result, including an unknown id, is a [`DeletionOutcome`].
    pub async fn delete(&self, id: &EntityId) -> LifecycleResult<DeletionOutcome> {
        self.policy.authorize(Operation::Delete).await?;
        Ok(self.delete_authorized(id).await)
    }

    /// Delete path for callers that already authorized the operation.
    pub(crate) async fn delete_authorized(&self, id: &EntityId) -> DeletionOutcome {
        let Ok(entity) = self.store.get(id).await else {
            debug!("Delete requested for unknown entity {}", id);
            return DeletionOutcome::failed(FailureReason::NotFound);
        };

        let outcome = if entity.active {
            debug!("Entity {} is active, deactivating", id);
            self.deactivate(&entity).await
        } else {
            debug!("Entity {} is inactive, requesting hard delete", id);
            self.hard_delete(&entity).await
        };

        self.store.apply_outcome(id, &outcome).await;
        if outcome.is_failure() {
            warn!("Delete of {} {}", id, outcome);
        } else {
            debug!("Delete of {} finished: {}", id, outcome);
        }
        outcome
    }

    async fn deactivate(&self, entity: &CatalogEntity) -> DeletionOutcome {
        let response = match self.mode {
            DeactivationMode::DeleteEndpoint => self.transport.delete_entity(&entity.id).await,
            DeactivationMode::UpdateEndpoint => {
                let update = entity.clone().with_active(false);
                self.transport.update_entity(&update).await
            }
        };

        match (self.mode, response) {
            (_, Err(e)) => DeletionOutcome::failed(e.failure_reason()),
            (_, Ok(r)) if r.is_not_found() => DeletionOutcome::failed(FailureReason::RemoteNotFound),
            (_, Ok(r)) if r.is_success() => DeletionOutcome::Inactivated,
            (DeactivationMode::DeleteEndpoint, Ok(r)) => match self.classifier.classify(&r) {
                Classification::Conflict { .. } => DeletionOutcome::Inactivated,
                Classification::UnknownFailure { message } => {
                    DeletionOutcome::failed(FailureReason::Server {
                        status: r.status,
                        message,
                    })
                }
            },
            (DeactivationMode::UpdateEndpoint, Ok(r)) => server_failure(&r),
        }
    }

    async fn hard_delete(&self, entity: &CatalogEntity) -> DeletionOutcome {
        let response = match self.transport.delete_entity(&entity.id).await {
            Ok(response) => response,
            Err(e) => return DeletionOutcome::failed(e.failure_reason()),
        };

        if response.is_success() {
            return DeletionOutcome::Deleted;
        }
        if response.is_not_found() {
            return DeletionOutcome::failed(FailureReason::RemoteNotFound);
        }

        match self.classifier.classify(&response) {
            Classification::Conflict { message } => DeletionOutcome::ConflictRetained { message },
            Classification::UnknownFailure { message } => {
                DeletionOutcome::failed(FailureReason::Server {
                    status: response.status,
                    message,
                })
            }
        }
    }
}

fn server_failure(response: &ServiceResponse) -> DeletionOutcome {
    DeletionOutcome::failed(FailureReason::Server {
        status: response.status,
        message: extract_message(response.body.as_deref()),
    })
}
