//! Snapshot tests for CLI output
//!
//! These tests use insta to capture the plain-text renderings the CLI prints.
//! Run `cargo insta review` to review and accept snapshot changes.

mod common;

use std::sync::Arc;

use insta::assert_snapshot;
use serde_json::json;

use common::{flux_root, pod_wire, wire, wire_event, with_children};
use fluxtree::cli::replay;
use fluxtree::cli::summary::{describe_outcome, render_layout, render_summary};
use fluxtree::decode::wire::{WireFluxMetadata, WireNode};
use fluxtree::decode::{decode_event, decode_node};
use fluxtree::graph::{LayoutOptions, LayoutScheduler, ProjectionOptions, TreeLayout};
use fluxtree::{EventStore, MessageRouter, TreeStore};

fn in_namespace(mut node: WireNode, namespace: &str) -> WireNode {
    node.namespace = Some(namespace.to_string());
    node
}

fn fleet() -> WireNode {
    let mut release = wire("hr-uid", "podinfo", "HelmRelease");
    release.status = Some("failed".to_string());
    release.flux_metadata = Some(WireFluxMetadata {
        is_suspended: true,
        ..Default::default()
    });
    let mut helm_repo = wire("repo-uid", "podinfo", "HelmRepository");
    helm_repo.status = Some("pending".to_string());

    flux_root(vec![
        in_namespace(
            wire("sc-uid", "source-controller", "Deployment"),
            "flux-system",
        ),
        in_namespace(
            wire("kc-uid", "kustomize-controller", "Deployment"),
            "flux-system",
        ),
        in_namespace(wire("git-uid", "flux-system", "GitRepository"), "flux-system"),
        release,
        helm_repo,
    ])
}

#[test]
fn test_summary_rendering() {
    let mut store = TreeStore::default();
    store.replace_tree(decode_node(fleet()).unwrap());
    let mut events = EventStore::default();
    events.add_event(decode_event(wire_event("ev-1", "Warning", "hr-uid")).unwrap());

    let summary = render_summary(&store, &events);
    assert_snapshot!(summary.trim_end(), @r"
    Tree: Kustomization flux-system/flux-system (6 nodes)
    Applications (2):
      success  Kustomization   flux-system/flux-system
      failed   HelmRelease     default/podinfo [suspended]
    Repositories (2):
      success  GitRepository   flux-system/flux-system
      pending  HelmRepository  default/podinfo
    Controllers (2):
      success  Deployment      flux-system/kustomize-controller
      success  Deployment      flux-system/source-controller
    Events: 1 (new: yes, warnings: yes)
    ");
}

#[test]
fn test_layout_rendering() {
    let tree = flux_root(vec![with_children(
        wire("web-uid", "web", "Deployment"),
        vec![
            pod_wire("pod-a", "web-uid", "Running"),
            pod_wire("pod-b", "web-uid", "Running"),
        ],
    )]);
    let mut store = TreeStore::default();
    store.replace_tree(decode_node(tree).unwrap());

    let scheduler = LayoutScheduler::new(
        Arc::new(TreeLayout),
        ProjectionOptions::default(),
        LayoutOptions::default(),
    );
    let layout = scheduler.layout_now(&store, "").unwrap();

    assert_snapshot!(render_layout(&layout).trim_end(), @r"
    root-uid (resource) at 0,130
    web-uid (deployment) at 255,130
    pod-a (pod) at 510,0
    pod-b (pod) at 510,260
    root-uid -> web-uid
    web-uid -> pod-a
    web-uid -> pod-b
    ");
}

#[test]
fn test_replay_transcript() {
    let session = [
        json!({"type": "tree", "message": flux_root(vec![wire("web-uid", "web", "Deployment")])}),
        json!({"type": "connected", "clientId": "c-42", "message": null}),
        json!({"type": "resource_add", "message": pod_wire("pod-a", "web-uid", "Pending")}),
        json!({"type": "resource_add", "message": pod_wire("pod-z", "gone-uid", "Pending")}),
        json!({"type": "event", "message": wire_event("ev-1", "Warning", "web-uid")}),
        json!({"type": "event", "message": wire_event("ev-1", "Warning", "web-uid")}),
        json!({"type": "metrics", "message": {}}),
        json!({"type": "PING"}),
    ]
    .iter()
    .map(|v| v.to_string())
    .collect::<Vec<_>>()
    .join("\n");

    let mut router = MessageRouter::default();
    let transcript = replay(&mut router, &session)
        .iter()
        .map(describe_outcome)
        .collect::<Vec<_>>()
        .join("\n");

    assert_snapshot!(transcript, @r"
    tree replaced (2 nodes)
    connected (c-42)
    add -> Applied
    add -> MissingParent
    event added (Warning: [Kustomization] apps ReconciliationFailed - kustomize build failed)
    event duplicate (Warning: [Kustomization] apps ReconciliationFailed - kustomize build failed)
    ignored metrics
    heartbeat
    ");
}
