mod common;

use catalog_lifecycle::transport::mock::{MockCall, MockReply, MockTransport};
use catalog_lifecycle::{
    LifecycleError, Operation, PermissionSetPolicy, StatusToggle, TransportError,
};
use catalog_types::FailureReason;
use common::{entity, id, store_with};
use pretty_assertions::assert_eq;
use std::sync::Arc;

async fn toggle_over(
    entities: Vec<catalog_types::CatalogEntity>,
) -> (Arc<catalog_store::EntityStore>, Arc<MockTransport>, StatusToggle) {
    let store = store_with(entities).await;
    let transport = Arc::new(MockTransport::new());
    let toggle = StatusToggle::new(store.clone(), transport.clone());
    (store, transport, toggle)
}

#[tokio::test]
async fn toggle_flips_active_flag() {
    let (store, transport, toggle) = toggle_over(vec![entity("cat-1", true)]).await;

    let now_active = toggle.toggle(&id("cat-1")).await.unwrap();

    assert!(!now_active);
    assert!(!store.get(&id("cat-1")).await.unwrap().active);
    assert_eq!(
        transport.calls(),
        vec![MockCall::Update {
            id: id("cat-1"),
            active: false
        }]
    );
}

#[tokio::test]
async fn double_toggle_restores_original_state() {
    for initial in [true, false] {
        let (store, _transport, toggle) = toggle_over(vec![entity("cat-1", initial)]).await;

        toggle.toggle(&id("cat-1")).await.unwrap();
        toggle.toggle(&id("cat-1")).await.unwrap();

        assert_eq!(store.get(&id("cat-1")).await.unwrap().active, initial);
    }
}

#[tokio::test]
async fn toggle_never_issues_delete() {
    let (_store, transport, toggle) = toggle_over(vec![entity("cat-1", false)]).await;

    toggle.toggle(&id("cat-1")).await.unwrap();

    assert_eq!(transport.delete_calls_for(&id("cat-1")), 0);
}

#[tokio::test]
async fn rejected_toggle_leaves_entity_unchanged() {
    let (store, transport, toggle) = toggle_over(vec![entity("cat-1", true)]).await;
    transport.script_update(
        &id("cat-1"),
        MockReply::body(500, r#"{"message":"database unavailable"}"#),
    );

    let err = toggle.toggle(&id("cat-1")).await.unwrap_err();

    assert!(matches!(
        err,
        LifecycleError::Failed(FailureReason::Server { status: 500, .. })
    ));
    assert!(store.get(&id("cat-1")).await.unwrap().active);
}

#[tokio::test]
async fn toggle_network_error_is_failed() {
    let (store, transport, toggle) = toggle_over(vec![entity("cat-1", false)]).await;
    transport.script_update(&id("cat-1"), MockReply::Fail(TransportError::Timeout));

    let err = toggle.toggle(&id("cat-1")).await.unwrap_err();

    assert!(matches!(err, LifecycleError::Failed(FailureReason::Timeout)));
    assert!(!store.get(&id("cat-1")).await.unwrap().active);
}

#[tokio::test]
async fn toggle_remote_404_is_remote_not_found() {
    let (_store, transport, toggle) = toggle_over(vec![entity("cat-1", true)]).await;
    transport.script_update(&id("cat-1"), MockReply::status(404));

    let err = toggle.toggle(&id("cat-1")).await.unwrap_err();

    assert!(matches!(
        err,
        LifecycleError::Failed(FailureReason::RemoteNotFound)
    ));
}

#[tokio::test]
async fn toggle_unknown_id_is_not_found() {
    let (_store, transport, toggle) = toggle_over(vec![]).await;

    let err = toggle.toggle(&id("ghost")).await.unwrap_err();

    assert!(matches!(err, LifecycleError::NotFound(missing) if missing == id("ghost")));
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn set_active_is_noop_when_flag_matches() {
    let (_store, transport, toggle) = toggle_over(vec![entity("cat-1", true)]).await;

    let active = toggle.set_active(&id("cat-1"), true).await.unwrap();

    assert!(active);
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn set_active_is_safe_to_retry() {
    let (store, transport, toggle) = toggle_over(vec![entity("cat-1", false)]).await;

    toggle.set_active(&id("cat-1"), true).await.unwrap();
    toggle.set_active(&id("cat-1"), true).await.unwrap();

    assert!(store.get(&id("cat-1")).await.unwrap().active);
    assert_eq!(transport.call_count(), 1);
}

#[tokio::test]
async fn unauthorized_toggle_sends_nothing() {
    let store = store_with(vec![entity("cat-1", true)]).await;
    let transport = Arc::new(MockTransport::new());
    let toggle = StatusToggle::new(store.clone(), transport.clone())
        .with_policy(Arc::new(PermissionSetPolicy::new([Operation::Delete])));

    let err = toggle.toggle(&id("cat-1")).await.unwrap_err();

    assert!(matches!(
        err,
        LifecycleError::Unauthorized {
            operation: Operation::ToggleStatus,
            ..
        }
    ));
    assert_eq!(transport.call_count(), 0);
    assert!(store.get(&id("cat-1")).await.unwrap().active);
}
