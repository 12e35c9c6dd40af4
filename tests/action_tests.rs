//! Resource action tests
//!
//! Reconcile/suspend/resume against a mocked backend: optimistic flags,
//! rollback on failure, and rejection of kinds Flux does not manage.

mod common;

use std::sync::Arc;

use async_trait::async_trait;
use mockall::mock;

use common::{ROOT_UID, flux_root, pod_wire, wire, wire_event, with_children};
use fluxtree::decode::decode_node;
use fluxtree::decode::wire::{WireEvent, WireNode};
use fluxtree::realtime::{Envelope, MessageKind, RealtimeSink, start_watch_logs};
use fluxtree::services::{ResourceAction, ResourceApi, ResourceService};
use fluxtree::{EventStore, LookupError, RemoteActionError, TreeStore};

mock! {
    pub Api {}

    #[async_trait]
    impl ResourceApi for Api {
        async fn fetch_tree(&self) -> anyhow::Result<WireNode>;
        async fn fetch_events(&self) -> anyhow::Result<Vec<WireEvent>>;
        async fn describe(&self, uid: &str) -> anyhow::Result<String>;
        async fn perform(&self, action: ResourceAction, uid: &str) -> Result<(), RemoteActionError>;
    }
}

mock! {
    pub Sink {}

    #[async_trait]
    impl RealtimeSink for Sink {
        async fn send(&self, envelope: Envelope) -> anyhow::Result<()>;
    }
}

/// root -> app (HelmRelease) -> web (Deployment) -> web-pod
fn cluster() -> WireNode {
    flux_root(vec![with_children(
        wire("app-uid", "app", "HelmRelease"),
        vec![with_children(
            wire("web-uid", "web", "Deployment"),
            vec![pod_wire("web-pod", "web-uid", "Running")],
        )],
    )])
}

fn store() -> TreeStore {
    let mut store = TreeStore::default();
    store.replace_tree(decode_node(cluster()).unwrap());
    store
}

fn suspended(store: &TreeStore, uid: &str) -> bool {
    store.find_by_id(uid).unwrap().flux().unwrap().is_suspended
}

#[tokio::test]
async fn test_load_tree_and_events() {
    let mut api = MockApi::new();
    api.expect_fetch_tree().times(1).returning(|| Ok(cluster()));
    api.expect_fetch_events().times(1).returning(|| {
        Ok(vec![
            wire_event("ev-1", "Normal", "app-uid"),
            wire_event("ev-2", "Warning", "app-uid"),
            wire_event("ev-1", "Normal", "app-uid"),
        ])
    });
    let service = ResourceService::new(Arc::new(api));

    let mut store = TreeStore::default();
    assert_eq!(service.load_tree(&mut store).await.unwrap(), 4);
    assert_eq!(store.root().uid, ROOT_UID);

    let mut events = EventStore::default();
    assert_eq!(service.load_events(&mut events).await.unwrap(), 2);
    assert!(!events.has_new_events());
}

#[tokio::test]
async fn test_suspend_applies_flag() {
    let mut api = MockApi::new();
    api.expect_perform().times(1).returning(|action, uid| {
        assert_eq!(action, ResourceAction::Suspend);
        assert_eq!(uid, "app-uid");
        Ok(())
    });
    let service = ResourceService::new(Arc::new(api));
    let mut store = store();

    service.suspend(&mut store, "app-uid").await.unwrap();
    assert!(suspended(&store, "app-uid"));
}

#[tokio::test]
async fn test_failed_suspend_rolls_back() {
    let mut api = MockApi::new();
    api.expect_perform().times(1).returning(|action, uid| {
        Err(RemoteActionError::Http {
            action: action.as_str(),
            uid: uid.to_string(),
            status: 500,
        })
    });
    let service = ResourceService::new(Arc::new(api));
    let mut store = store();

    let err = service.suspend(&mut store, "app-uid").await.unwrap_err();
    assert!(matches!(err, RemoteActionError::Http { status: 500, .. }));
    assert!(!suspended(&store, "app-uid"));
}

#[tokio::test]
async fn test_failure_after_newer_update_keeps_update() {
    let service = ResourceService::new(Arc::new(MockApi::new()));
    let mut store = store();

    let pending = service
        .begin(&mut store, ResourceAction::Suspend, "app-uid")
        .unwrap();
    assert!(suspended(&store, "app-uid"));

    // Authoritative update lands while the request is in flight
    let mut update = wire("app-uid", "app", "HelmRelease");
    update.parent_id = Some(ROOT_UID.to_string());
    update.flux_metadata = Some(fluxtree::decode::wire::WireFluxMetadata {
        is_suspended: true,
        ..Default::default()
    });
    assert!(store.update_node(decode_node(update).unwrap()).is_applied());

    let failure = Err(RemoteActionError::Transport {
        action: "suspend",
        uid: "app-uid".to_string(),
        message: "connection reset".to_string(),
    });
    assert!(service.complete(&mut store, pending, failure).is_err());
    assert!(suspended(&store, "app-uid"));
}

#[tokio::test]
async fn test_non_flux_kind_is_not_reconcilable() {
    let mut api = MockApi::new();
    api.expect_perform().times(0);
    let service = ResourceService::new(Arc::new(api));
    let mut store = store();
    let version = store.version();

    let err = service.reconcile(&mut store, "web-uid").await.unwrap_err();
    assert!(matches!(
        err,
        RemoteActionError::NotReconcilable { ref kind, .. } if kind == "Deployment"
    ));

    let err = service.resume(&mut store, "missing").await.unwrap_err();
    assert!(matches!(
        err,
        RemoteActionError::Lookup(LookupError::NotFound(_))
    ));
    assert_eq!(store.version(), version);
}

#[tokio::test]
async fn test_reconcile_marks_reconciling() {
    let mut api = MockApi::new();
    api.expect_perform().returning(|_, _| Ok(()));
    let service = ResourceService::new(Arc::new(api));
    let mut store = store();

    service.reconcile(&mut store, ROOT_UID).await.unwrap();
    let flux = store.root().flux().unwrap();
    assert!(flux.is_reconciling);
    assert!(!flux.is_suspended);
}

#[tokio::test]
async fn test_describe_passes_text_through() {
    let mut api = MockApi::new();
    api.expect_describe()
        .times(1)
        .returning(|uid| Ok(format!("kind: HelmRelease\nmetadata:\n  uid: {}\n", uid)));
    let service = ResourceService::new(Arc::new(api));

    let text = service.describe("app-uid").await.unwrap();
    assert_eq!(text, "kind: HelmRelease\nmetadata:\n  uid: app-uid\n");
}

#[tokio::test]
async fn test_start_watch_logs_only_for_pods() {
    let mut sink = MockSink::new();
    sink.expect_send().times(1).returning(|envelope| {
        assert_eq!(envelope.message_kind(), Some(MessageKind::StartWatchLogs));
        assert_eq!(envelope.message, serde_json::json!("web-pod"));
        Ok(())
    });
    let store = store();

    let pod = store.find_by_id("web-pod").unwrap();
    start_watch_logs(&sink, pod).await.unwrap();

    let deployment = store.find_by_id("web-uid").unwrap();
    assert!(start_watch_logs(&sink, deployment).await.is_err());
}
