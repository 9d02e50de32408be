//! Per-entity delete outcomes and bulk aggregation.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::EntityId;

/// Why a lifecycle request did not take effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureReason {
    /// The id is not in the local projection. No request was sent.
    NotFound,
    /// The service answered 404 for an id the projection still holds.
    RemoteNotFound,
    /// The transport gave up waiting for a response.
    Timeout,
    /// The request never produced a response.
    Network { message: String },
    /// The service answered with a status that was not classified as a conflict.
    Server {
        status: u16,
        message: Option<String>,
    },
    /// The response could not be interpreted.
    Malformed { message: String },
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::NotFound => f.write_str("not found"),
            FailureReason::RemoteNotFound => f.write_str("not found on the catalog service"),
            FailureReason::Timeout => f.write_str("timeout"),
            FailureReason::Network { message } => write!(f, "network error: {message}"),
            FailureReason::Server {
                status,
                message: Some(message),
            } => write!(f, "server error {status}: {message}"),
            FailureReason::Server {
                status,
                message: None,
            } => write!(f, "unexpected status {status}"),
            FailureReason::Malformed { message } => write!(f, "malformed response: {message}"),
        }
    }
}

/// The result of one delete request against one entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DeletionOutcome {
    /// Was active, now inactive and still present.
    Inactivated,
    /// Was inactive, the service confirmed removal.
    Deleted,
    /// Was inactive, the service refused removal because dependents still
    /// reference it. The entity stays present and inactive.
    ConflictRetained { message: Option<String> },
    /// The request failed for a reason other than a dependency conflict.
    Failed { reason: FailureReason },
}

impl DeletionOutcome {
    /// Shorthand for a failed outcome.
    pub fn failed(reason: FailureReason) -> Self {
        DeletionOutcome::Failed { reason }
    }

    /// True for `Inactivated` and `Deleted`.
    pub fn is_success(&self) -> bool {
        matches!(self, DeletionOutcome::Inactivated | DeletionOutcome::Deleted)
    }

    /// True for `ConflictRetained`.
    pub fn is_conflict(&self) -> bool {
        matches!(self, DeletionOutcome::ConflictRetained { .. })
    }

    /// True for `Failed`.
    pub fn is_failure(&self) -> bool {
        matches!(self, DeletionOutcome::Failed { .. })
    }
}

impl fmt::Display for DeletionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeletionOutcome::Inactivated => f.write_str("inactivated"),
            DeletionOutcome::Deleted => f.write_str("deleted"),
            DeletionOutcome::ConflictRetained { message: Some(m) } => {
                write!(f, "kept (still referenced: {m})")
            }
            DeletionOutcome::ConflictRetained { message: None } => {
                f.write_str("kept (still referenced)")
            }
            DeletionOutcome::Failed { reason } => write!(f, "failed: {reason}"),
        }
    }
}

/// Derived counts over a bulk result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkCounts {
    pub succeeded: usize,
    pub conflicted: usize,
    pub failed: usize,
}

impl BulkCounts {
    /// Total number of items counted.
    pub fn total(&self) -> usize {
        self.succeeded + self.conflicted + self.failed
    }

    fn record(&mut self, outcome: &DeletionOutcome) {
        match outcome {
            DeletionOutcome::Inactivated | DeletionOutcome::Deleted => self.succeeded += 1,
            DeletionOutcome::ConflictRetained { .. } => self.conflicted += 1,
            DeletionOutcome::Failed { .. } => self.failed += 1,
        }
    }
}

/// Ordered per-item outcomes of one bulk run.
///
/// Counts are always derived from the items, so they sum to `len()`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkOperationResult {
    items: Vec<(EntityId, DeletionOutcome)>,
    counts: BulkCounts,
}

impl BulkOperationResult {
    /// Creates an empty result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one item outcome.
    pub fn push(&mut self, id: EntityId, outcome: DeletionOutcome) {
        self.counts.record(&outcome);
        self.items.push((id, outcome));
    }

    /// Per-item outcomes in input order.
    pub fn items(&self) -> &[(EntityId, DeletionOutcome)] {
        &self.items
    }

    /// Looks up the outcome for one id.
    pub fn outcome_for(&self, id: &EntityId) -> Option<&DeletionOutcome> {
        self.items
            .iter()
            .find(|(item_id, _)| item_id == id)
            .map(|(_, outcome)| outcome)
    }

    pub fn counts(&self) -> BulkCounts {
        self.counts
    }

    pub fn succeeded(&self) -> usize {
        self.counts.succeeded
    }

    pub fn conflicted(&self) -> usize {
        self.counts.conflicted
    }

    pub fn failed(&self) -> usize {
        self.counts.failed
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Ids whose outcome is a failure, with the reason.
    pub fn failures(&self) -> impl Iterator<Item = (&EntityId, &FailureReason)> {
        self.items.iter().filter_map(|(id, outcome)| match outcome {
            DeletionOutcome::Failed { reason } => Some((id, reason)),
            _ => None,
        })
    }

    /// One-line report for display, e.g. "3 removed, 1 still referenced, 0 failed".
    pub fn summary(&self) -> String {
        format!(
            "{} removed, {} still referenced, {} failed",
            self.counts.succeeded, self.counts.conflicted, self.counts.failed
        )
    }
}

impl FromIterator<(EntityId, DeletionOutcome)> for BulkOperationResult {
    fn from_iter<I: IntoIterator<Item = (EntityId, DeletionOutcome)>>(iter: I) -> Self {
        let mut result = Self::new();
        for (id, outcome) in iter {
            result.push(id, outcome);
        }
        result
    }
}
