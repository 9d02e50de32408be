//! Lifecycle configuration, read from a TOML file.
//!
//! Every section and field has a default, so an absent file or a partial one
//! is valid.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::bulk::DEFAULT_MAX_CONCURRENCY;
use crate::classifier::ConflictPolicy;
use crate::deletion::DeactivationMode;
use crate::error::ConfigError;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleConfig {
    pub service: ServiceConfig,
    pub conflicts: ConflictPolicy,
    pub deletion: DeletionConfig,
    pub bulk: BulkConfig,
}

impl LifecycleConfig {
    /// Loads configuration from `path`.
    ///
    /// A missing file yields the defaults; an unreadable or malformed file is
    /// an error.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            info!("No config file at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&contents)?;
        info!("Loaded config from {:?}", path);
        Ok(config)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }
}

/// Where and how to reach the catalog service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Base URL (e.g. `http://localhost:8080/api`).
    pub base_url: String,
    pub entities_path: String,
    pub dependents_path: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Bearer token sent with every request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api".to_string(),
            entities_path: "/entities".to_string(),
            dependents_path: "/dependents".to_string(),
            timeout_secs: 30,
            token: None,
        }
    }
}

/// Delete state machine settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeletionConfig {
    pub mode: DeactivationMode,
}

/// Bulk run settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BulkConfig {
    /// Maximum delete requests in flight at once.
    pub max_concurrency: usize,
}

impl Default for BulkConfig {
    fn default() -> Self {
        Self {
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }
}
