#![allow(dead_code)]

use catalog_lifecycle::transport::mock::MockTransport;
use catalog_lifecycle::{
    Classification, ConflictClassifier, DeletionCoordinator, HeuristicClassifier, ServiceResponse,
};
use catalog_store::EntityStore;
use catalog_types::{CatalogEntity, EntityId};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub fn id(s: &str) -> EntityId {
    EntityId::new(s).unwrap()
}

pub fn entity(s: &str, active: bool) -> CatalogEntity {
    CatalogEntity::new(id(s), format!("Category {s}"))
        .unwrap()
        .with_active(active)
}

pub async fn store_with(entities: Vec<CatalogEntity>) -> Arc<EntityStore> {
    let store = Arc::new(EntityStore::new());
    for e in entities {
        store.upsert(e).await.unwrap();
    }
    store
}

/// Wraps the default classifier and counts how often it is consulted.
#[derive(Default)]
pub struct CountingClassifier {
    inner: HeuristicClassifier,
    calls: AtomicUsize,
}

impl CountingClassifier {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ConflictClassifier for CountingClassifier {
    fn classify(&self, response: &ServiceResponse) -> Classification {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.classify(response)
    }
}

pub struct Fixture {
    pub store: Arc<EntityStore>,
    pub transport: Arc<MockTransport>,
    pub classifier: Arc<CountingClassifier>,
    pub coordinator: Arc<DeletionCoordinator>,
}

pub async fn fixture(entities: Vec<CatalogEntity>) -> Fixture {
    fixture_with(entities, MockTransport::new()).await
}

pub async fn fixture_with(entities: Vec<CatalogEntity>, transport: MockTransport) -> Fixture {
    let store = store_with(entities).await;
    let transport = Arc::new(transport);
    let classifier = Arc::new(CountingClassifier::default());
    let coordinator = Arc::new(
        DeletionCoordinator::new(store.clone(), transport.clone())
            .with_classifier(classifier.clone()),
    );
    Fixture {
        store,
        transport,
        classifier,
        coordinator,
    }
}
