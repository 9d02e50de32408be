//! Error types for the lifecycle layer.

use catalog_store::StoreError;
use catalog_types::{EntityId, FailureReason};
use thiserror::Error;

use crate::policy::Operation;

/// Result type for lifecycle operations.
pub type LifecycleResult<T> = Result<T, LifecycleError>;

/// Result type for transport calls.
pub type TransportResult<T> = Result<T, TransportError>;

/// Operation-level errors.
///
/// Per-item failures inside a bulk run never surface here; they are captured
/// as [`DeletionOutcome::Failed`](catalog_types::DeletionOutcome::Failed).
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// The id is not in the local projection.
    #[error("entity not found: {0}")]
    NotFound(EntityId),

    /// The access policy refused the whole operation.
    #[error("not authorized to {operation}: {reason}")]
    Unauthorized { operation: Operation, reason: String },

    /// A single-entity request did not take effect.
    #[error("request failed: {0}")]
    Failed(FailureReason),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl LifecycleError {
    /// Builds an authorization failure for `operation`.
    pub fn unauthorized(operation: Operation, reason: impl Into<String>) -> Self {
        LifecycleError::Unauthorized {
            operation,
            reason: reason.into(),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, LifecycleError::Unauthorized { .. })
    }
}

/// Errors raised by a [`CatalogTransport`](crate::CatalogTransport) before a
/// usable response exists.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Timeout.
    #[error("request timed out")]
    Timeout,

    /// Network error (connection refused, reset, DNS, ...).
    #[error("network error: {0}")]
    Network(String),

    /// The service answered, but not with a success status.
    #[error("unexpected status {status}")]
    Status { status: u16, message: Option<String> },

    /// The response body could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// The transport could not be built from its configuration.
    #[error("invalid transport configuration: {0}")]
    Config(String),
}

impl TransportError {
    /// Maps the error to the reason reported in a failed outcome.
    ///
    /// A timeout is always reported as a failure, never as a conflict.
    pub fn failure_reason(&self) -> FailureReason {
        match self {
            TransportError::Timeout => FailureReason::Timeout,
            TransportError::Network(message) | TransportError::Config(message) => {
                FailureReason::Network {
                    message: message.clone(),
                }
            }
            TransportError::Status { status, message } => FailureReason::Server {
                status: *status,
                message: message.clone(),
            },
            TransportError::Decode(message) => FailureReason::Malformed {
                message: message.clone(),
            },
        }
    }
}

/// Errors loading a [`LifecycleConfig`](crate::LifecycleConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}
