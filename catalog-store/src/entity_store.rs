use catalog_types::{CatalogEntity, DeletionOutcome, EntityId};
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{StoreError, StoreResult};

/// Which entities [`EntityStore::list`] returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Inactive,
}

impl StatusFilter {
    fn matches(self, entity: &CatalogEntity) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => entity.active,
            StatusFilter::Inactive => !entity.active,
        }
    }
}

/// What a snapshot merge changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SnapshotStats {
    pub inserted: usize,
    pub updated: usize,
    pub removed: usize,
    /// Snapshot rows ignored because their id was hard-deleted this session.
    pub skipped_tombstoned: usize,
}

#[derive(Debug, Default)]
struct Inner {
    entities: HashMap<EntityId, CatalogEntity>,
    tombstones: HashSet<EntityId>,
}

/// Addressable in-memory projection of catalog entities.
#[derive(Debug, Default)]
pub struct EntityStore {
    inner: RwLock<Inner>,
}

impl EntityStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the entity.
    pub async fn get(&self, id: &EntityId) -> StoreResult<CatalogEntity> {
        self.inner
            .read()
            .await
            .entities
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    pub async fn contains(&self, id: &EntityId) -> bool {
        self.inner.read().await.entities.contains_key(id)
    }

    pub async fn is_tombstoned(&self, id: &EntityId) -> bool {
        self.inner.read().await.tombstones.contains(id)
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.entities.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.entities.is_empty()
    }

    /// Lists entities matching the filter, sorted by name then id.
    pub async fn list(&self, filter: StatusFilter) -> Vec<CatalogEntity> {
        let inner = self.inner.read().await;
        let mut entities: Vec<CatalogEntity> = inner
            .entities
            .values()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect();
        entities.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        entities
    }

    /// Inserts or replaces one entity.
    pub async fn upsert(&self, entity: CatalogEntity) -> StoreResult<()> {
        entity.validate()?;
        let mut inner = self.inner.write().await;
        if inner.tombstones.contains(&entity.id) {
            return Err(StoreError::Tombstoned(entity.id));
        }
        inner.entities.insert(entity.id.clone(), entity);
        Ok(())
    }

    /// Merges a freshly fetched list into the projection.
    ///
    /// Rows are upserted one by one; tombstoned ids are skipped and local
    /// entities missing from the snapshot are dropped without tombstoning,
    /// since the service may list them again later. Invalid rows are skipped.
    pub async fn merge_snapshot(&self, snapshot: Vec<CatalogEntity>) -> SnapshotStats {
        let mut stats = SnapshotStats::default();
        let mut inner = self.inner.write().await;
        let mut seen = HashSet::with_capacity(snapshot.len());

        for entity in snapshot {
            if let Err(e) = entity.validate() {
                debug!("Skipping invalid snapshot row {}: {}", entity.id, e);
                continue;
            }
            if inner.tombstones.contains(&entity.id) {
                stats.skipped_tombstoned += 1;
                continue;
            }
            seen.insert(entity.id.clone());
            match inner.entities.insert(entity.id.clone(), entity) {
                Some(_) => stats.updated += 1,
                None => stats.inserted += 1,
            }
        }

        let before = inner.entities.len();
        inner.entities.retain(|id, _| seen.contains(id));
        stats.removed = before - inner.entities.len();

        debug!(
            "Merged snapshot: {} inserted, {} updated, {} removed, {} tombstoned skipped",
            stats.inserted, stats.updated, stats.removed, stats.skipped_tombstoned
        );
        stats
    }

    /// Sets the informational dependent counters. Ids absent from `counts` get 0.
    pub async fn set_dependent_counts(&self, counts: &HashMap<EntityId, u64>) {
        let mut inner = self.inner.write().await;
        for (id, entity) in inner.entities.iter_mut() {
            entity.dependent_count = counts.get(id).copied().unwrap_or(0);
        }
    }

    /// Applies a delete outcome to the projection.
    ///
    /// `Inactivated` clears the active flag, `Deleted` removes and tombstones
    /// the id, `ConflictRetained` and `Failed` leave the entity untouched.
    /// Applying to an id that is no longer present is a no-op.
    pub async fn apply_outcome(&self, id: &EntityId, outcome: &DeletionOutcome) {
        let mut inner = self.inner.write().await;
        match outcome {
            DeletionOutcome::Inactivated => match inner.entities.get_mut(id) {
                Some(entity) => entity.active = false,
                None => debug!("Inactivated outcome for unknown entity {}", id),
            },
            DeletionOutcome::Deleted => {
                if inner.entities.remove(id).is_none() {
                    debug!("Deleted outcome for unknown entity {}", id);
                }
                inner.tombstones.insert(id.clone());
            }
            DeletionOutcome::ConflictRetained { .. } | DeletionOutcome::Failed { .. } => {}
        }
    }

    /// Sets the active flag after a confirmed status update.
    pub async fn apply_status(&self, id: &EntityId, active: bool) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        let entity = inner
            .entities
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        entity.active = active;
        Ok(())
    }
}
