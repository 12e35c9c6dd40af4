//! Snapshot decoder
//!
//! Turns wire DTOs into domain objects. Children are decoded depth-first
//! before their parent is assembled, so a parent never holds a partially
//! built child. Kind-specific metadata is chosen by a static table keyed on
//! the `kind` string; unknown kinds decode to the generic shape.
//!
//! Full-tree snapshots on the realtime channel are `base64(gzip(json))`.

pub mod wire;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Datelike, SecondsFormat, Utc};
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use std::io::{Read, Write};

use crate::error::DecodeError;
use crate::models::{
    Condition, DeploymentMetadata, EventType, FluxMetadata, GitRepositoryMetadata,
    HelmReleaseMetadata, KindMetadata, KubeEvent, KustomizationMetadata, LogLine,
    OciRepositoryMetadata, PodMetadata, PvcMetadata, ResourceKind, ResourceNode, ResourceStatus,
    SourceRef,
};
use wire::{
    WireCondition, WireDeploymentMetadata, WireEvent, WireFluxMetadata,
    WireGitRepositoryMetadata, WireHelmReleaseMetadata, WireKustomizationMetadata, WireLog,
    WireNode, WireOciRepositoryMetadata, WirePodMetadata, WirePvcMetadata, WireSourceRef,
};

type MetadataDecoder = fn(&WireNode) -> Result<KindMetadata, DecodeError>;

/// Kinds with dedicated metadata; everything else is `KindMetadata::Generic`
const METADATA_DECODERS: &[(ResourceKind, MetadataDecoder)] = &[
    (ResourceKind::Kustomization, decode_kustomization),
    (ResourceKind::HelmRelease, decode_helm_release),
    (ResourceKind::HelmChart, decode_helm_chart),
    (ResourceKind::HelmRepository, decode_helm_repository),
    (ResourceKind::GitRepository, decode_git_repository),
    (ResourceKind::OCIRepository, decode_oci_repository),
    (ResourceKind::Deployment, decode_deployment),
    (ResourceKind::Pod, decode_pod),
    (ResourceKind::PersistentVolumeClaim, decode_pvc),
];

/// Decode a node and its whole subtree
pub fn decode_node(wire: WireNode) -> Result<ResourceNode, DecodeError> {
    let parent = wire.parent().map(str::to_string);
    decode_with_parent(wire, parent)
}

fn decode_with_parent(
    wire: WireNode,
    parent_id: Option<String>,
) -> Result<ResourceNode, DecodeError> {
    let metadata = decode_metadata(&wire)?;
    let status = decode_status(wire.status.as_deref())?;
    let created_at = parse_time("createdAt", &wire.created_at)?;
    let deleted_at = parse_optional_time("deletedAt", wire.deleted_at.as_deref())?;

    let WireNode {
        uid,
        name,
        kind,
        version,
        group,
        resource,
        namespace,
        annotations,
        labels,
        conditions,
        events,
        is_flux_managed,
        children,
        ..
    } = wire;

    let children = children
        .into_iter()
        .map(|child| decode_with_parent(child, Some(uid.clone())))
        .collect::<Result<Vec<_>, _>>()?;
    let conditions = conditions
        .into_iter()
        .map(decode_condition)
        .collect::<Result<Vec<_>, _>>()?;
    let events = events
        .into_iter()
        .map(decode_event)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ResourceNode {
        uid,
        name,
        kind,
        api_version: non_empty(version),
        group: non_empty(group),
        resource_name: non_empty(resource),
        namespace: non_empty(namespace),
        created_at,
        deleted_at,
        annotations,
        labels,
        status,
        conditions,
        events,
        logs: Vec::new(),
        is_flux_managed,
        metadata,
        children,
        parent_id,
    })
}

/// Decode a `base64(gzip(json))` full-tree payload
pub fn decode_compressed_tree(payload: &str) -> Result<ResourceNode, DecodeError> {
    let wire = inflate_tree(payload)?;
    decode_node(wire)
}

/// Undo the transport compression without building domain objects
pub fn inflate_tree(payload: &str) -> Result<WireNode, DecodeError> {
    let compressed = STANDARD.decode(payload.trim())?;
    let mut decoder = GzDecoder::new(&compressed[..]);
    let mut json = Vec::new();
    decoder.read_to_end(&mut json)?;
    tracing::debug!(
        "Inflated tree snapshot ({} -> {} bytes)",
        compressed.len(),
        json.len()
    );
    Ok(serde_json::from_slice(&json)?)
}

/// Produce the compressed form served on the realtime channel
pub fn compress_tree(wire: &WireNode) -> std::io::Result<String> {
    let json = serde_json::to_vec(wire)?;
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&json)?;
    let compressed = encoder.finish()?;
    Ok(STANDARD.encode(compressed))
}

pub fn decode_event(wire: WireEvent) -> Result<KubeEvent, DecodeError> {
    Ok(KubeEvent {
        first_observed: parse_time("firstObserved", &wire.first_observed)?,
        last_observed: parse_time("lastObserved", &wire.last_observed)?,
        event_type: EventType::parse_lenient(&wire.event_type),
        uid: wire.uid,
        kind: wire.kind,
        name: wire.name,
        namespace: wire.namespace,
        reason: wire.reason,
        message: wire.message,
        source: wire.source,
        count: wire.count,
        resource_uid: wire.resource_uid,
    })
}

/// Decode a log line, returning the uid of the pod it belongs to
pub fn decode_log(wire: WireLog) -> Result<(String, LogLine), DecodeError> {
    let line = LogLine {
        timestamp: parse_time("timestamp", &wire.timestamp)?,
        container: wire.container,
        text: wire.log,
    };
    Ok((wire.uid, line))
}

fn decode_condition(wire: WireCondition) -> Result<Condition, DecodeError> {
    Ok(Condition {
        last_transition_time: parse_time("lastTransitionTime", &wire.last_transition_time)?,
        condition_type: wire.condition_type,
        status: wire.status == "True",
        message: wire.message,
        reason: wire.reason,
    })
}

fn decode_status(status: Option<&str>) -> Result<ResourceStatus, DecodeError> {
    match status {
        None | Some("") => Ok(ResourceStatus::Unknown),
        Some(s) => s
            .parse()
            .map_err(|_| DecodeError::UnknownStatus(s.to_string())),
    }
}

fn decode_metadata(wire: &WireNode) -> Result<KindMetadata, DecodeError> {
    match METADATA_DECODERS
        .iter()
        .find(|(kind, _)| kind.as_str() == wire.kind)
    {
        Some((_, decode)) => decode(wire),
        None => Ok(KindMetadata::Generic),
    }
}

/// Flux state from `fluxMetadata`, falling back to the kind-specific block
fn decode_flux(
    wire: &WireNode,
    reconciling: bool,
    suspended: bool,
    handled_at: Option<&str>,
) -> Result<FluxMetadata, DecodeError> {
    let flux = wire.flux_metadata.clone().unwrap_or_default();
    let last_handled = match parse_optional_time(
        "fluxMetadata.lastHandledReconcileAt",
        flux.last_handled_reconcile_at.as_deref(),
    )? {
        Some(at) => Some(at),
        None => parse_optional_time("lastHandledReconcileAt", handled_at)?,
    };
    Ok(FluxMetadata {
        is_reconciling: flux.is_reconciling || reconciling,
        is_suspended: flux.is_suspended || suspended,
        last_handled_reconcile_at: last_handled,
        last_sync_at: parse_optional_time("fluxMetadata.lastSyncAt", flux.last_sync_at.as_deref())?,
    })
}

fn decode_source_ref(wire: Option<WireSourceRef>) -> Option<SourceRef> {
    wire.filter(|r| !r.kind.is_empty() || !r.name.is_empty())
        .map(|r| SourceRef {
            kind: r.kind,
            name: r.name,
            namespace: non_empty(r.namespace),
        })
}

fn decode_kustomization(wire: &WireNode) -> Result<KindMetadata, DecodeError> {
    let spec = wire.kustomization_metadata.clone().unwrap_or_default();
    let flux = decode_flux(
        wire,
        spec.is_reconciling,
        spec.is_suspended,
        spec.last_handled_reconcile_at.as_deref(),
    )?;
    Ok(KindMetadata::Kustomization {
        flux,
        spec: KustomizationMetadata {
            path: spec.path,
            source_ref: decode_source_ref(spec.source_ref),
            last_applied_revision: spec.last_applied_revision,
            last_attempted_revision: spec.last_attempted_revision,
            depends_on: spec.depends_on,
        },
    })
}

fn decode_helm_release(wire: &WireNode) -> Result<KindMetadata, DecodeError> {
    let spec = wire.helm_release_metadata.clone().unwrap_or_default();
    let flux = decode_flux(wire, spec.is_reconciling, spec.is_suspended, None)?;
    Ok(KindMetadata::HelmRelease {
        flux,
        spec: HelmReleaseMetadata {
            chart_name: spec.chart_name,
            chart_version: spec.chart_version,
            source_ref: decode_source_ref(spec.source_ref),
        },
    })
}

fn decode_helm_chart(wire: &WireNode) -> Result<KindMetadata, DecodeError> {
    Ok(KindMetadata::HelmChart {
        flux: decode_flux(wire, false, false, None)?,
    })
}

fn decode_helm_repository(wire: &WireNode) -> Result<KindMetadata, DecodeError> {
    Ok(KindMetadata::HelmRepository {
        flux: decode_flux(wire, false, false, None)?,
    })
}

fn decode_git_repository(wire: &WireNode) -> Result<KindMetadata, DecodeError> {
    let spec = wire.git_repository_metadata.clone().unwrap_or_default();
    Ok(KindMetadata::GitRepository {
        flux: decode_flux(wire, false, false, None)?,
        spec: GitRepositoryMetadata {
            url: spec.url,
            branch: non_empty(spec.branch),
            tag: non_empty(spec.tag),
            semver: non_empty(spec.semver),
            name: non_empty(spec.name),
            commit: non_empty(spec.commit),
        },
    })
}

fn decode_oci_repository(wire: &WireNode) -> Result<KindMetadata, DecodeError> {
    let spec = wire.oci_repository_metadata.clone().unwrap_or_default();
    Ok(KindMetadata::OciRepository {
        flux: decode_flux(wire, false, false, None)?,
        spec: OciRepositoryMetadata {
            url: spec.url,
            digest: non_empty(spec.digest),
            tag: non_empty(spec.tag),
            semver: non_empty(spec.semver),
            semver_filter: non_empty(spec.semver_filter),
        },
    })
}

fn decode_deployment(wire: &WireNode) -> Result<KindMetadata, DecodeError> {
    let spec = wire.deployment_metadata.clone().unwrap_or_default();
    Ok(KindMetadata::Deployment(DeploymentMetadata {
        replicas: spec.replicas,
        ready_replicas: spec.ready_replicas,
        updated_replicas: spec.updated_replicas,
        available_replicas: spec.available_replicas,
        images: spec.images,
    }))
}

fn decode_pod(wire: &WireNode) -> Result<KindMetadata, DecodeError> {
    let spec = wire.pod_metadata.clone().unwrap_or_default();
    Ok(KindMetadata::Pod(PodMetadata {
        phase: spec.phase,
        image: spec.image,
    }))
}

fn decode_pvc(wire: &WireNode) -> Result<KindMetadata, DecodeError> {
    let spec = wire.pvc_metadata.clone().unwrap_or_default();
    Ok(KindMetadata::PersistentVolumeClaim(PvcMetadata {
        storage_class: spec.storage_class,
        volume_name: spec.volume_name,
        volume_mode: spec.volume_mode,
        access_modes: spec.access_modes,
        capacity: spec.capacity,
        phase: spec.phase,
    }))
}

fn parse_time(field: &'static str, value: &str) -> Result<DateTime<Utc>, DecodeError> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| DecodeError::Timestamp {
            field,
            value: value.to_string(),
        })
}

/// Absent, empty and Go zero-value (`0001-01-01T00:00:00Z`) timestamps are `None`
fn parse_optional_time(
    field: &'static str,
    value: Option<&str>,
) -> Result<Option<DateTime<Utc>>, DecodeError> {
    match value {
        None | Some("") => Ok(None),
        Some(v) => {
            let parsed = parse_time(field, v)?;
            Ok((parsed.year() > 1).then_some(parsed))
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn format_time(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Encode a node and its subtree back into wire form.
///
/// Pod logs are local state and are not encoded.
pub fn encode_node(node: &ResourceNode) -> WireNode {
    let mut wire = WireNode {
        uid: node.uid.clone(),
        name: node.name.clone(),
        kind: node.kind.clone(),
        version: node.api_version.clone(),
        group: node.group.clone(),
        resource: node.resource_name.clone(),
        namespace: node.namespace.clone(),
        parent_id: node.parent_id.clone(),
        parent_ids: Vec::new(),
        created_at: format_time(&node.created_at),
        deleted_at: node.deleted_at.as_ref().map(format_time),
        annotations: node.annotations.clone(),
        labels: node.labels.clone(),
        status: Some(node.status.as_str().to_string()),
        conditions: node.conditions.iter().map(encode_condition).collect(),
        events: node.events.iter().map(encode_event).collect(),
        is_flux_managed: node.is_flux_managed,
        children: node.children.iter().map(encode_node).collect(),
        ..Default::default()
    };

    if let Some(flux) = node.metadata.flux() {
        wire.flux_metadata = Some(WireFluxMetadata {
            last_handled_reconcile_at: flux.last_handled_reconcile_at.as_ref().map(format_time),
            last_sync_at: flux.last_sync_at.as_ref().map(format_time),
            is_suspended: flux.is_suspended,
            is_reconciling: flux.is_reconciling,
        });
    }

    match &node.metadata {
        KindMetadata::Kustomization { flux, spec } => {
            wire.kustomization_metadata = Some(WireKustomizationMetadata {
                path: spec.path.clone(),
                is_reconciling: flux.is_reconciling,
                is_suspended: flux.is_suspended,
                source_ref: spec.source_ref.as_ref().map(encode_source_ref),
                last_applied_revision: spec.last_applied_revision.clone(),
                last_attempted_revision: spec.last_attempted_revision.clone(),
                last_handled_reconcile_at: flux.last_handled_reconcile_at.as_ref().map(format_time),
                depends_on: spec.depends_on.clone(),
            });
        }
        KindMetadata::HelmRelease { flux, spec } => {
            wire.helm_release_metadata = Some(WireHelmReleaseMetadata {
                chart_name: spec.chart_name.clone(),
                chart_version: spec.chart_version.clone(),
                is_reconciling: flux.is_reconciling,
                is_suspended: flux.is_suspended,
                source_ref: spec.source_ref.as_ref().map(encode_source_ref),
            });
        }
        KindMetadata::GitRepository { spec, .. } => {
            wire.git_repository_metadata = Some(WireGitRepositoryMetadata {
                url: spec.url.clone(),
                branch: spec.branch.clone(),
                tag: spec.tag.clone(),
                semver: spec.semver.clone(),
                name: spec.name.clone(),
                commit: spec.commit.clone(),
            });
        }
        KindMetadata::OciRepository { spec, .. } => {
            wire.oci_repository_metadata = Some(WireOciRepositoryMetadata {
                url: spec.url.clone(),
                digest: spec.digest.clone(),
                tag: spec.tag.clone(),
                semver: spec.semver.clone(),
                semver_filter: spec.semver_filter.clone(),
            });
        }
        KindMetadata::Deployment(spec) => {
            wire.deployment_metadata = Some(WireDeploymentMetadata {
                replicas: spec.replicas,
                ready_replicas: spec.ready_replicas,
                updated_replicas: spec.updated_replicas,
                available_replicas: spec.available_replicas,
                images: spec.images.clone(),
            });
        }
        KindMetadata::Pod(spec) => {
            wire.pod_metadata = Some(WirePodMetadata {
                phase: spec.phase.clone(),
                image: spec.image.clone(),
            });
        }
        KindMetadata::PersistentVolumeClaim(spec) => {
            wire.pvc_metadata = Some(WirePvcMetadata {
                storage_class: spec.storage_class.clone(),
                volume_name: spec.volume_name.clone(),
                volume_mode: spec.volume_mode.clone(),
                access_modes: spec.access_modes.clone(),
                capacity: spec.capacity.clone(),
                phase: spec.phase.clone(),
            });
        }
        KindMetadata::HelmChart { .. } | KindMetadata::HelmRepository { .. } | KindMetadata::Generic => {}
    }

    wire
}

fn encode_source_ref(source: &SourceRef) -> WireSourceRef {
    WireSourceRef {
        kind: source.kind.clone(),
        name: source.name.clone(),
        namespace: source.namespace.clone(),
    }
}

fn encode_condition(condition: &Condition) -> WireCondition {
    WireCondition {
        last_transition_time: format_time(&condition.last_transition_time),
        condition_type: condition.condition_type.clone(),
        status: if condition.status { "True" } else { "False" }.to_string(),
        message: condition.message.clone(),
        reason: condition.reason.clone(),
    }
}

pub fn encode_event(event: &KubeEvent) -> WireEvent {
    WireEvent {
        uid: event.uid.clone(),
        kind: event.kind.clone(),
        name: event.name.clone(),
        namespace: event.namespace.clone(),
        reason: event.reason.clone(),
        message: event.message.clone(),
        source: event.source.clone(),
        event_type: event.event_type.as_str().to_string(),
        first_observed: format_time(&event.first_observed),
        last_observed: format_time(&event.last_observed),
        count: event.count,
        resource_uid: event.resource_uid.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wire(uid: &str, kind: &str) -> WireNode {
        WireNode {
            uid: uid.to_string(),
            name: uid.to_string(),
            kind: kind.to_string(),
            created_at: "2025-01-01T00:00:00Z".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_zero_time_is_absent() {
        assert_eq!(
            parse_optional_time("deletedAt", Some("0001-01-01T00:00:00Z")).unwrap(),
            None
        );
        assert!(
            parse_optional_time("deletedAt", Some("2025-02-01T10:00:00Z"))
                .unwrap()
                .is_some()
        );
    }

    #[test]
    fn test_children_get_parent_ids() {
        let mut root = wire("root", "Kustomization");
        let mut mid = wire("mid", "Deployment");
        mid.children.push(wire("leaf", "Pod"));
        root.children.push(mid);

        let node = decode_node(root).unwrap();
        assert_eq!(node.parent_id, None);
        assert_eq!(node.children[0].parent_id.as_deref(), Some("root"));
        assert_eq!(node.children[0].children[0].parent_id.as_deref(), Some("mid"));
    }

    #[test]
    fn test_flux_metadata_falls_back_to_kind_block() {
        let mut ks = wire("ks", "Kustomization");
        ks.kustomization_metadata = Some(WireKustomizationMetadata {
            is_suspended: true,
            last_handled_reconcile_at: Some("2025-01-02T00:00:00Z".to_string()),
            ..Default::default()
        });
        let node = decode_node(ks).unwrap();
        let flux = node.flux().unwrap();
        assert!(flux.is_suspended);
        assert!(flux.last_handled_reconcile_at.is_some());
    }

    #[test]
    fn test_unknown_kind_is_generic() {
        let node = decode_node(wire("x", "SealedSecret")).unwrap();
        assert_eq!(node.metadata, KindMetadata::Generic);
        assert!(!node.is_reconcilable());
    }

    #[test]
    fn test_compress_round_trip() {
        let mut root = wire("root", "Kustomization");
        root.children.push(wire("pod", "Pod"));
        let payload = compress_tree(&root).unwrap();
        assert_eq!(inflate_tree(&payload).unwrap(), root);
    }
}
