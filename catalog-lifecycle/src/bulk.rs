//! Bulk delete with per-item isolation.
//!
//! Every selected id is attempted exactly once. Items run concurrently up to
//! a limit and settle independently: a failed item is recorded in the result
//! and never cancels its siblings. Each outcome reaches the store as soon as
//! that item resolves, so observers see partial progress.

use catalog_types::{BulkOperationResult, DeletionOutcome, EntityId};
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info};

use crate::deletion::DeletionCoordinator;
use crate::error::LifecycleResult;
use crate::policy::Operation;

/// Default cap on delete requests in flight during one bulk run.
pub const DEFAULT_MAX_CONCURRENCY: usize = 8;

/// Progress notification emitted as each item resolves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemSettled {
    pub id: EntityId,
    pub outcome: DeletionOutcome,
}

/// Fans deletes out over a selection and collects the outcomes.
pub struct BulkOperationCoordinator {
    deletion: Arc<DeletionCoordinator>,
    max_concurrency: usize,
}

impl BulkOperationCoordinator {
    pub fn new(deletion: Arc<DeletionCoordinator>) -> Self {
        Self {
            deletion,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }

    /// Caps concurrent requests. Zero is treated as one.
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Deletes every id in the selection.
    ///
    /// Duplicate ids are attempted once. An empty selection returns an empty
    /// result without an authorization check. Authorization is checked once
    /// before dispatch; a refusal touches nothing.
    pub async fn run(&self, ids: &[EntityId]) -> LifecycleResult<BulkOperationResult> {
        self.run_inner(ids, None).await
    }

    /// Like [`run`](Self::run), also sending an [`ItemSettled`] per item.
    /// A dropped receiver does not affect the run.
    pub async fn run_with_progress(
        &self,
        ids: &[EntityId],
        progress: UnboundedSender<ItemSettled>,
    ) -> LifecycleResult<BulkOperationResult> {
        self.run_inner(ids, Some(&progress)).await
    }

    async fn run_inner(
        &self,
        ids: &[EntityId],
        progress: Option<&UnboundedSender<ItemSettled>>,
    ) -> LifecycleResult<BulkOperationResult> {
        let selection = unique_in_order(ids);
        if selection.is_empty() {
            debug!("Bulk delete called with an empty selection");
            return Ok(BulkOperationResult::new());
        }

        self.deletion
            .policy()
            .authorize(Operation::BulkDelete)
            .await?;

        info!(
            "Bulk delete of {} entities (max {} in flight)",
            selection.len(),
            self.max_concurrency
        );

        let deletion = &self.deletion;
        let settled: Vec<(EntityId, DeletionOutcome)> = stream::iter(selection)
            .map(|id| async move {
                let outcome = deletion.delete_authorized(&id).await;
                if let Some(tx) = progress {
                    let _ = tx.send(ItemSettled {
                        id: id.clone(),
                        outcome: outcome.clone(),
                    });
                }
                (id, outcome)
            })
            .buffered(self.max_concurrency)
            .collect()
            .await;

        let result: BulkOperationResult = settled.into_iter().collect();
        info!("Bulk delete finished: {}", result.summary());
        Ok(result)
    }
}

fn unique_in_order(ids: &[EntityId]) -> Vec<EntityId> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.iter()
        .filter(|id| seen.insert((*id).clone()))
        .cloned()
        .collect()
}
