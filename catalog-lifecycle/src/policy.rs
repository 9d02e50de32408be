//! Operation-level access checks.
//!
//! Authorization is decided once per operation, before any request is sent.
//! Issuing sessions or permissions is the host application's job; this module
//! only defines the gate the coordinators call.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::error::{LifecycleError, LifecycleResult};

/// A lifecycle operation subject to authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Delete,
    BulkDelete,
    ToggleStatus,
    Refresh,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Delete => "delete",
            Operation::BulkDelete => "bulk delete",
            Operation::ToggleStatus => "toggle status",
            Operation::Refresh => "refresh",
        };
        f.write_str(name)
    }
}

/// Decides whether the current caller may run an operation at all.
#[async_trait]
pub trait AccessPolicy: Send + Sync {
    /// Returns `Err(LifecycleError::Unauthorized)` to refuse the operation.
    async fn authorize(&self, operation: Operation) -> LifecycleResult<()>;
}

/// Allows everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAllPolicy;

#[async_trait]
impl AccessPolicy for AllowAllPolicy {
    async fn authorize(&self, _operation: Operation) -> LifecycleResult<()> {
        Ok(())
    }
}

/// Allows exactly the operations that were granted.
#[derive(Debug, Clone, Default)]
pub struct PermissionSetPolicy {
    granted: HashSet<Operation>,
}

impl PermissionSetPolicy {
    pub fn new(granted: impl IntoIterator<Item = Operation>) -> Self {
        Self {
            granted: granted.into_iter().collect(),
        }
    }

    /// A caller that may only load the catalog.
    pub fn read_only() -> Self {
        Self::new([Operation::Refresh])
    }

    pub fn grant(&mut self, operation: Operation) {
        self.granted.insert(operation);
    }

    pub fn is_granted(&self, operation: Operation) -> bool {
        self.granted.contains(&operation)
    }
}

#[async_trait]
impl AccessPolicy for PermissionSetPolicy {
    async fn authorize(&self, operation: Operation) -> LifecycleResult<()> {
        if self.is_granted(operation) {
            Ok(())
        } else {
            Err(LifecycleError::unauthorized(
                operation,
                "permission not granted",
            ))
        }
    }
}
