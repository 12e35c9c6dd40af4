//! Resource tree node
//!
//! A `ResourceNode` owns its children outright; the only back-reference is the
//! `parent_id` uid. Identity is the `uid`, which is unique across the tree.

use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

use crate::constants::MAX_EVENTS_PER_RESOURCE;
use crate::models::event::KubeEvent;
use crate::models::metadata::{FluxMetadata, KindMetadata, Repository};
use crate::models::resource_kind::ResourceKind;

/// Aggregate health of a resource
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ResourceStatus {
    #[default]
    Unknown,
    Success,
    Failed,
    Pending,
    Warning,
}

impl ResourceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceStatus::Unknown => "unknown",
            ResourceStatus::Success => "success",
            ResourceStatus::Failed => "failed",
            ResourceStatus::Pending => "pending",
            ResourceStatus::Warning => "warning",
        }
    }
}

impl fmt::Display for ResourceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ResourceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unknown" => Ok(ResourceStatus::Unknown),
            "success" => Ok(ResourceStatus::Success),
            "failed" => Ok(ResourceStatus::Failed),
            "pending" => Ok(ResourceStatus::Pending),
            "warning" => Ok(ResourceStatus::Warning),
            _ => Err(format!("Invalid ResourceStatus: {}", s)),
        }
    }
}

/// Kubernetes-style status assertion
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub last_transition_time: DateTime<Utc>,
    pub condition_type: String,
    pub status: bool,
    pub message: String,
    pub reason: String,
}

impl Condition {
    /// Condition types whose `True` status means the resource is healthy
    pub fn is_ready_type(&self) -> bool {
        matches!(
            self.condition_type.as_str(),
            "Ready" | "Healthy" | "Released" | "Available"
        )
    }

    /// True when the condition asserts a failure
    pub fn is_error(&self) -> bool {
        match self.condition_type.as_str() {
            "Stalled" => self.status,
            _ if self.is_ready_type() => !self.status,
            _ => false,
        }
    }
}

/// One line of pod output
#[derive(Debug, Clone, PartialEq)]
pub struct LogLine {
    pub timestamp: DateTime<Utc>,
    pub container: String,
    /// Raw text, possibly with terminal color escapes
    pub text: String,
}

impl LogLine {
    /// Text with ANSI escape sequences removed, for plain-text sinks
    pub fn plain_text(&self) -> String {
        let mut out = String::with_capacity(self.text.len());
        let mut chars = self.text.chars().peekable();
        while let Some(c) = chars.next() {
            if c != '\u{1b}' {
                out.push(c);
                continue;
            }
            match chars.next() {
                // CSI: parameters and intermediates up to a final byte in @..~
                Some('[') => {
                    for next in chars.by_ref() {
                        if ('@'..='~').contains(&next) {
                            break;
                        }
                    }
                }
                // OSC: payload up to BEL or ST (ESC \)
                Some(']') => {
                    while let Some(next) = chars.next() {
                        if next == '\u{7}' {
                            break;
                        }
                        if next == '\u{1b}' && chars.peek() == Some(&'\\') {
                            chars.next();
                            break;
                        }
                    }
                }
                _ => {}
            }
        }
        out
    }
}

/// A node in the resource tree
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceNode {
    pub uid: String,
    pub name: String,
    pub kind: String,
    pub api_version: Option<String>,
    pub group: Option<String>,
    pub resource_name: Option<String>,
    /// Omitted for cluster-scoped kinds
    pub namespace: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Set on tombstones
    pub deleted_at: Option<DateTime<Utc>>,
    pub annotations: BTreeMap<String, String>,
    pub labels: BTreeMap<String, String>,
    pub status: ResourceStatus,
    pub conditions: Vec<Condition>,
    pub events: Vec<KubeEvent>,
    /// Newest first; only filled for pods
    pub logs: Vec<LogLine>,
    pub is_flux_managed: bool,
    pub metadata: KindMetadata,
    pub children: Vec<ResourceNode>,
    pub parent_id: Option<String>,
}

impl ResourceNode {
    /// Empty root used before the first snapshot arrives
    pub fn placeholder() -> Self {
        Self {
            uid: String::new(),
            name: String::new(),
            kind: String::new(),
            api_version: None,
            group: None,
            resource_name: None,
            namespace: None,
            created_at: DateTime::<Utc>::default(),
            deleted_at: None,
            annotations: BTreeMap::new(),
            labels: BTreeMap::new(),
            status: ResourceStatus::Unknown,
            conditions: Vec::new(),
            events: Vec::new(),
            logs: Vec::new(),
            is_flux_managed: false,
            metadata: KindMetadata::Generic,
            children: Vec::new(),
            parent_id: None,
        }
    }

    pub fn resource_kind(&self) -> Option<ResourceKind> {
        ResourceKind::parse_optional(&self.kind)
    }

    pub fn is_kind(&self, kind: ResourceKind) -> bool {
        self.kind == kind.as_str()
    }

    /// Only Flux-managed kinds accept reconcile/suspend/resume
    pub fn is_reconcilable(&self) -> bool {
        self.metadata.flux().is_some()
    }

    pub fn is_tombstone(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub fn flux(&self) -> Option<&FluxMetadata> {
        self.metadata.flux()
    }

    pub fn repository(&self) -> Option<&dyn Repository> {
        self.metadata.repository()
    }

    /// `namespace/name`, or just the name for cluster-scoped kinds
    pub fn display_name(&self) -> String {
        match &self.namespace {
            Some(ns) => format!("{}/{}", ns, self.name),
            None => self.name.clone(),
        }
    }

    /// Merge an authoritative update into this node in place.
    ///
    /// Identity, children and the local log buffer are kept; events are merged
    /// by uid; every other field takes the incoming value.
    pub fn merge_from(&mut self, incoming: ResourceNode) {
        let ResourceNode {
            uid: _,
            name,
            kind,
            api_version,
            group,
            resource_name,
            namespace,
            created_at,
            deleted_at,
            annotations,
            labels,
            status,
            conditions,
            events,
            logs: _,
            is_flux_managed,
            metadata,
            children: _,
            parent_id,
        } = incoming;

        self.name = name;
        self.kind = kind;
        self.api_version = api_version;
        self.group = group;
        self.resource_name = resource_name;
        self.namespace = namespace;
        self.created_at = created_at;
        self.deleted_at = deleted_at;
        self.annotations = annotations;
        self.labels = labels;
        self.status = status;
        self.conditions = conditions;
        self.is_flux_managed = is_flux_managed;
        self.metadata = metadata;
        if parent_id.is_some() {
            self.parent_id = parent_id;
        }
        self.merge_events(events);
    }

    /// Append events with unseen uids, keeping the most recent ones past the cap
    pub fn merge_events(&mut self, incoming: Vec<KubeEvent>) {
        let mut seen: HashSet<String> = self.events.iter().map(|e| e.uid.clone()).collect();
        for event in incoming {
            if seen.insert(event.uid.clone()) {
                self.events.push(event);
            }
        }
        if self.events.len() > MAX_EVENTS_PER_RESOURCE {
            self.events.sort_by(|a, b| b.last_observed.cmp(&a.last_observed));
            self.events.truncate(MAX_EVENTS_PER_RESOURCE);
        }
    }

    /// Number of nodes in this subtree, including self
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(|c| c.subtree_len()).sum::<usize>()
    }
}
