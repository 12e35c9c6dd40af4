//! Wire-format DTOs
//!
//! Mirrors the JSON served by `GET /api/tree`, `GET /api/events` and the
//! realtime channel. Timestamps stay strings here so the decoder can report
//! which field was malformed. The backend serializes nil slices and maps as
//! `null`, which every collection field tolerates.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Deserialize `null` as the type's default
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireNode {
    pub uid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(
        default,
        rename = "parentIDs",
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub parent_ids: Vec<String>,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub annotations: BTreeMap<String, String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub labels: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub conditions: Vec<WireCondition>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub events: Vec<WireEvent>,
    #[serde(default)]
    pub is_flux_managed: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub children: Vec<WireNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flux_metadata: Option<WireFluxMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kustomization_metadata: Option<WireKustomizationMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub helm_release_metadata: Option<WireHelmReleaseMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_repository_metadata: Option<WireGitRepositoryMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oci_repository_metadata: Option<WireOciRepositoryMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment_metadata: Option<WireDeploymentMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pod_metadata: Option<WirePodMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pvc_metadata: Option<WirePvcMetadata>,
}

impl WireNode {
    /// Parent uid, preferring the explicit field over the backend's list form
    pub fn parent(&self) -> Option<&str> {
        self.parent_id
            .as_deref()
            .or_else(|| self.parent_ids.first().map(String::as_str))
            .filter(|p| !p.is_empty())
    }
}

/// Addressing information only; full nodes deserialize into this too
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireNodeRef {
    pub uid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(
        default,
        rename = "parentIDs",
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub parent_ids: Vec<String>,
}

impl WireNodeRef {
    pub fn parent(&self) -> Option<&str> {
        self.parent_id
            .as_deref()
            .or_else(|| self.parent_ids.first().map(String::as_str))
            .filter(|p| !p.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireCondition {
    pub last_transition_time: String,
    #[serde(rename = "type")]
    pub condition_type: String,
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireEvent {
    pub uid: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub source: String,
    #[serde(rename = "type", default)]
    pub event_type: String,
    pub first_observed: String,
    pub last_observed: String,
    #[serde(default)]
    pub count: i32,
    #[serde(rename = "resourceUID", default)]
    pub resource_uid: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireLog {
    /// Pod the line belongs to
    pub uid: String,
    #[serde(alias = "message")]
    pub log: String,
    pub timestamp: String,
    #[serde(default)]
    pub container: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireSourceRef {
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireFluxMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_handled_reconcile_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_sync_at: Option<String>,
    #[serde(default)]
    pub is_suspended: bool,
    #[serde(default)]
    pub is_reconciling: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireKustomizationMetadata {
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub is_reconciling: bool,
    #[serde(default)]
    pub is_suspended: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_ref: Option<WireSourceRef>,
    #[serde(default)]
    pub last_applied_revision: String,
    #[serde(default)]
    pub last_attempted_revision: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_handled_reconcile_at: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub depends_on: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireHelmReleaseMetadata {
    #[serde(default)]
    pub chart_name: String,
    #[serde(default)]
    pub chart_version: String,
    #[serde(default)]
    pub is_reconciling: bool,
    #[serde(default)]
    pub is_suspended: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_ref: Option<WireSourceRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireGitRepositoryMetadata {
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semver: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireOciRepositoryMetadata {
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semver: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semver_filter: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireDeploymentMetadata {
    #[serde(default)]
    pub replicas: i32,
    #[serde(default)]
    pub ready_replicas: i32,
    #[serde(default)]
    pub updated_replicas: i32,
    #[serde(default)]
    pub available_replicas: i32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub images: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WirePodMetadata {
    #[serde(default)]
    pub phase: String,
    #[serde(default)]
    pub image: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WirePvcMetadata {
    #[serde(default)]
    pub storage_class: String,
    #[serde(default)]
    pub volume_name: String,
    #[serde(default)]
    pub volume_mode: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub access_modes: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub capacity: BTreeMap<String, String>,
    #[serde(default)]
    pub phase: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_collections_deserialize_as_empty() {
        let json = r#"{
            "uid": "a",
            "name": "a",
            "kind": "Pod",
            "createdAt": "2025-01-01T00:00:00Z",
            "children": null,
            "labels": null,
            "conditions": null,
            "parentIDs": null
        }"#;
        let node: WireNode = serde_json::from_str(json).unwrap();
        assert!(node.children.is_empty());
        assert!(node.labels.is_empty());
        assert!(node.conditions.is_empty());
        assert_eq!(node.parent(), None);
    }

    #[test]
    fn test_parent_falls_back_to_parent_ids() {
        let json = r#"{"uid": "a", "createdAt": "x", "parentIDs": ["p1", "p2"]}"#;
        let node: WireNode = serde_json::from_str(json).unwrap();
        assert_eq!(node.parent(), Some("p1"));

        let json = r#"{"uid": "a", "parentId": "p0", "parentIDs": ["p1"], "kind": "Pod"}"#;
        let node_ref: WireNodeRef = serde_json::from_str(json).unwrap();
        assert_eq!(node_ref.parent(), Some("p0"));
    }
}
