//! Fixtures shared by the integration tests

#![allow(dead_code)]

use fluxtree::decode::decode_node;
use fluxtree::decode::wire::{WireEvent, WireNode, WirePodMetadata};
use fluxtree::models::ResourceNode;

pub const CREATED_AT: &str = "2025-01-01T00:00:00Z";
pub const ROOT_UID: &str = "root-uid";

pub fn wire(uid: &str, name: &str, kind: &str) -> WireNode {
    WireNode {
        uid: uid.to_string(),
        name: name.to_string(),
        kind: kind.to_string(),
        namespace: Some("default".to_string()),
        created_at: CREATED_AT.to_string(),
        status: Some("success".to_string()),
        ..Default::default()
    }
}

pub fn with_children(mut node: WireNode, children: Vec<WireNode>) -> WireNode {
    node.children = children;
    node
}

/// The `flux-system` Kustomization every tree hangs off
pub fn flux_root(children: Vec<WireNode>) -> WireNode {
    let mut root = wire(ROOT_UID, "flux-system", "Kustomization");
    root.namespace = Some("flux-system".to_string());
    with_children(root, children)
}

pub fn pod_wire(uid: &str, parent: &str, phase: &str) -> WireNode {
    let mut pod = wire(uid, uid, "Pod");
    pod.parent_id = Some(parent.to_string());
    pod.pod_metadata = Some(WirePodMetadata {
        phase: phase.to_string(),
        image: "nginx:1.27".to_string(),
    });
    pod
}

/// Decoded node with `parent_id` set, ready for `add_node`/`update_node`
pub fn child_of(uid: &str, kind: &str, parent: &str) -> ResourceNode {
    let mut node = wire(uid, uid, kind);
    node.parent_id = Some(parent.to_string());
    decode_node(node).unwrap()
}

pub fn wire_event(uid: &str, event_type: &str, resource_uid: &str) -> WireEvent {
    WireEvent {
        uid: uid.to_string(),
        kind: "Kustomization".to_string(),
        name: "apps".to_string(),
        namespace: "flux-system".to_string(),
        reason: "ReconciliationFailed".to_string(),
        message: "kustomize build failed".to_string(),
        source: "kustomize-controller".to_string(),
        event_type: event_type.to_string(),
        first_observed: CREATED_AT.to_string(),
        last_observed: CREATED_AT.to_string(),
        count: 1,
        resource_uid: resource_uid.to_string(),
    }
}

/// Small deterministic generator so fixture trees are reproducible
pub struct Lcg(u64);

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Self(seed.wrapping_add(0x9E37_79B9_7F4A_7C15))
    }

    pub fn next_u64(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        self.0 >> 33
    }

    pub fn below(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }
}

pub const KINDS: &[&str] = &[
    "Kustomization",
    "HelmRelease",
    "HelmChart",
    "GitRepository",
    "OCIRepository",
    "Deployment",
    "Pod",
    "ConfigMap",
    "Service",
];

pub const STATUSES: &[&str] = &["success", "failed", "pending", "warning", "unknown"];

/// Random nested tree of `size` nodes under a `flux-system` root.
///
/// Uids are `g{seed}-{index}`, so every generated tree has unique uids.
pub fn generated_tree(seed: u64, size: usize) -> WireNode {
    let mut rng = Lcg::new(seed);
    let mut nodes = vec![flux_root(Vec::new())];
    let mut parents = Vec::new();
    for index in 1..size.max(1) {
        let kind = KINDS[rng.below(KINDS.len())];
        let mut node = wire(&format!("g{}-{}", seed, index), &format!("n{}", index), kind);
        node.status = Some(STATUSES[rng.below(STATUSES.len())].to_string());
        parents.push(rng.below(index));
        nodes.push(node);
    }
    // Parents always precede their children, so fold from the back
    while nodes.len() > 1 {
        let child = nodes.pop().unwrap();
        let parent = parents.pop().unwrap();
        nodes[parent].children.insert(0, child);
    }
    nodes.pop().unwrap()
}
