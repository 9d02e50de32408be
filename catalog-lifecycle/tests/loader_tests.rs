mod common;

use catalog_lifecycle::transport::mock::{MockCall, MockTransport};
use catalog_lifecycle::{
    CatalogLoader, LifecycleError, Operation, PermissionSetPolicy, TransportError,
};
use catalog_store::StatusFilter;
use common::{entity, id, store_with};
use pretty_assertions::assert_eq;
use std::collections::HashMap;
use std::sync::Arc;

#[tokio::test]
async fn refresh_fills_store_and_counts() {
    let store = store_with(vec![]).await;
    let transport = Arc::new(
        MockTransport::new()
            .with_entities(vec![entity("a", true), entity("b", false)])
            .with_dependent_counts(HashMap::from([(id("a"), 3)])),
    );
    let loader = CatalogLoader::new(store.clone(), transport.clone());

    let stats = loader.refresh().await.unwrap();

    assert_eq!(stats.inserted, 2);
    assert_eq!(store.len().await, 2);
    assert_eq!(store.get(&id("a")).await.unwrap().dependent_count, 3);
    assert_eq!(store.get(&id("b")).await.unwrap().dependent_count, 0);
    assert_eq!(store.list(StatusFilter::Inactive).await.len(), 1);
    assert_eq!(
        transport.calls(),
        vec![MockCall::List, MockCall::DependentCounts]
    );
}

#[tokio::test]
async fn failed_counts_keep_listed_values() {
    let mut listed = entity("a", true);
    listed.dependent_count = 5;
    let store = store_with(vec![]).await;
    let transport = Arc::new(
        MockTransport::new()
            .with_entities(vec![listed])
            .fail_dependent_counts(TransportError::Timeout),
    );
    let loader = CatalogLoader::new(store.clone(), transport);

    loader.refresh().await.unwrap();

    assert_eq!(store.get(&id("a")).await.unwrap().dependent_count, 5);
}

#[tokio::test]
async fn failed_listing_is_error_and_keeps_store() {
    let store = store_with(vec![entity("a", true)]).await;
    let transport = Arc::new(
        MockTransport::new().fail_list(TransportError::Network("connection refused".into())),
    );
    let loader = CatalogLoader::new(store.clone(), transport);

    let err = loader.refresh().await.unwrap_err();

    assert!(matches!(
        err,
        LifecycleError::Transport(TransportError::Network(_))
    ));
    assert!(store.contains(&id("a")).await);
}

#[tokio::test]
async fn refresh_drops_entities_missing_from_snapshot() {
    let store = store_with(vec![entity("a", true), entity("gone", true)]).await;
    let transport = Arc::new(MockTransport::new().with_entities(vec![entity("a", false)]));
    let loader = CatalogLoader::new(store.clone(), transport);

    let stats = loader.refresh().await.unwrap();

    assert_eq!(stats.removed, 1);
    assert_eq!(stats.updated, 1);
    assert!(!store.contains(&id("gone")).await);
    assert!(!store.get(&id("a")).await.unwrap().active);
}

#[tokio::test]
async fn refresh_does_not_resurrect_deleted_entities() {
    let store = store_with(vec![entity("a", false)]).await;
    store
        .apply_outcome(&id("a"), &catalog_types::DeletionOutcome::Deleted)
        .await;
    let transport = Arc::new(MockTransport::new().with_entities(vec![entity("a", false)]));
    let loader = CatalogLoader::new(store.clone(), transport);

    let stats = loader.refresh().await.unwrap();

    assert_eq!(stats.skipped_tombstoned, 1);
    assert!(!store.contains(&id("a")).await);
}

#[tokio::test]
async fn unauthorized_refresh_sends_nothing() {
    let store = store_with(vec![]).await;
    let transport = Arc::new(MockTransport::new().with_entities(vec![entity("a", true)]));
    let loader = CatalogLoader::new(store.clone(), transport.clone())
        .with_policy(Arc::new(PermissionSetPolicy::new([Operation::Delete])));

    let err = loader.refresh().await.unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(transport.call_count(), 0);
    assert!(store.is_empty().await);
}
