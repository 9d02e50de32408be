use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{EntityId, Error};

/// A catalog entity as seen by the lifecycle manager.
///
/// Only the fields the lifecycle needs are modelled. `dependent_count` is a
/// display hint; conflict decisions always come from the live delete response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntity {
    pub id: EntityId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub dependent_count: u64,
    pub created_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

impl CatalogEntity {
    /// Creates a new active entity with no dependents.
    pub fn new(id: EntityId, name: impl Into<String>) -> Result<Self, Error> {
        let entity = Self {
            id,
            name: name.into(),
            description: None,
            active: true,
            dependent_count: 0,
            created_at: Utc::now(),
        };
        entity.validate()?;
        Ok(entity)
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the active flag.
    #[must_use]
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Checks the invariants that deserialization alone cannot enforce.
    pub fn validate(&self) -> Result<(), Error> {
        if self.id.as_str().trim().is_empty() {
            return Err(Error::EmptyId);
        }
        if self.name.trim().is_empty() {
            return Err(Error::EmptyName);
        }
        Ok(())
    }

    /// Parses an entity from its JSON wire representation and validates it.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let entity: Self = serde_json::from_str(json)?;
        entity.validate()?;
        Ok(entity)
    }

    /// Returns true if the entity can be hard-deleted on the next delete call.
    pub fn is_deletion_candidate(&self) -> bool {
        !self.active
    }
}
