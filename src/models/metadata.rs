//! Kind-specific metadata
//!
//! Each node carries exactly one `KindMetadata` variant selected by its kind.
//! Flux variants share a `FluxMetadata` block for reconcile/suspend state.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Reconcile state common to every Flux-managed kind
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FluxMetadata {
    pub is_reconciling: bool,
    pub is_suspended: bool,
    pub last_handled_reconcile_at: Option<DateTime<Utc>>,
    /// Most recent time a reconcile completed
    pub last_sync_at: Option<DateTime<Utc>>,
}

/// Reference from an application to the source it pulls from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceRef {
    pub kind: String,
    pub name: String,
    pub namespace: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct KustomizationMetadata {
    pub path: String,
    pub source_ref: Option<SourceRef>,
    pub last_applied_revision: String,
    pub last_attempted_revision: String,
    /// Names of Kustomizations this one waits for
    pub depends_on: Vec<String>,
}

impl KustomizationMetadata {
    /// Revision hash without its `branch@sha1:` style prefix
    pub fn last_attempted_hash(&self) -> &str {
        match self.last_attempted_revision.find(':') {
            Some(idx) => &self.last_attempted_revision[idx + 1..],
            None => &self.last_attempted_revision,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HelmReleaseMetadata {
    pub chart_name: String,
    pub chart_version: String,
    pub source_ref: Option<SourceRef>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GitRepositoryMetadata {
    pub url: String,
    pub branch: Option<String>,
    pub tag: Option<String>,
    pub semver: Option<String>,
    pub name: Option<String>,
    pub commit: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OciRepositoryMetadata {
    pub url: String,
    pub digest: Option<String>,
    pub tag: Option<String>,
    pub semver: Option<String>,
    pub semver_filter: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeploymentMetadata {
    pub replicas: i32,
    pub ready_replicas: i32,
    pub updated_replicas: i32,
    pub available_replicas: i32,
    pub images: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PodMetadata {
    pub phase: String,
    pub image: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PvcMetadata {
    pub storage_class: String,
    pub volume_name: String,
    pub volume_mode: String,
    pub access_modes: Vec<String>,
    pub capacity: BTreeMap<String, String>,
    pub phase: String,
}

/// Metadata payload keyed by resource kind
#[derive(Debug, Clone, Default, PartialEq)]
pub enum KindMetadata {
    Kustomization {
        flux: FluxMetadata,
        spec: KustomizationMetadata,
    },
    HelmRelease {
        flux: FluxMetadata,
        spec: HelmReleaseMetadata,
    },
    HelmChart {
        flux: FluxMetadata,
    },
    HelmRepository {
        flux: FluxMetadata,
    },
    GitRepository {
        flux: FluxMetadata,
        spec: GitRepositoryMetadata,
    },
    OciRepository {
        flux: FluxMetadata,
        spec: OciRepositoryMetadata,
    },
    Deployment(DeploymentMetadata),
    Pod(PodMetadata),
    PersistentVolumeClaim(PvcMetadata),
    /// Any kind without dedicated metadata
    #[default]
    Generic,
}

impl KindMetadata {
    /// Flux reconcile state, present only on Flux-managed kinds
    pub fn flux(&self) -> Option<&FluxMetadata> {
        match self {
            KindMetadata::Kustomization { flux, .. }
            | KindMetadata::HelmRelease { flux, .. }
            | KindMetadata::HelmChart { flux }
            | KindMetadata::HelmRepository { flux }
            | KindMetadata::GitRepository { flux, .. }
            | KindMetadata::OciRepository { flux, .. } => Some(flux),
            _ => None,
        }
    }

    pub fn flux_mut(&mut self) -> Option<&mut FluxMetadata> {
        match self {
            KindMetadata::Kustomization { flux, .. }
            | KindMetadata::HelmRelease { flux, .. }
            | KindMetadata::HelmChart { flux }
            | KindMetadata::HelmRepository { flux }
            | KindMetadata::GitRepository { flux, .. }
            | KindMetadata::OciRepository { flux, .. } => Some(flux),
            _ => None,
        }
    }

    /// The source reference of a Kustomization or HelmRelease
    pub fn source_ref(&self) -> Option<&SourceRef> {
        match self {
            KindMetadata::Kustomization { spec, .. } => spec.source_ref.as_ref(),
            KindMetadata::HelmRelease { spec, .. } => spec.source_ref.as_ref(),
            _ => None,
        }
    }

    /// Repository view of Git and OCI sources
    pub fn repository(&self) -> Option<&dyn Repository> {
        match self {
            KindMetadata::GitRepository { spec, .. } => Some(spec as &dyn Repository),
            KindMetadata::OciRepository { spec, .. } => Some(spec as &dyn Repository),
            _ => None,
        }
    }
}

/// Sources that point at a fetchable artifact
pub trait Repository {
    /// Artifact URL
    fn url(&self) -> &str;

    /// Short human-readable reference: `@branch`, `:tag`, `@digest` and so on
    fn code(&self) -> String;
}

impl Repository for GitRepositoryMetadata {
    fn url(&self) -> &str {
        &self.url
    }

    fn code(&self) -> String {
        if let Some(branch) = &self.branch {
            return format!("@{}", branch);
        }
        if let Some(tag) = &self.tag {
            return format!(":{}", tag);
        }
        if let Some(semver) = &self.semver {
            return format!(":{}", semver);
        }
        if let Some(commit) = &self.commit {
            return format!(":{}", commit.chars().take(8).collect::<String>());
        }
        if let Some(name) = &self.name {
            return format!(":{}", name);
        }
        String::new()
    }
}

impl Repository for OciRepositoryMetadata {
    fn url(&self) -> &str {
        &self.url
    }

    fn code(&self) -> String {
        if let Some(digest) = &self.digest {
            // Drop the `sha256:` algorithm prefix
            let hash = digest.split_once(':').map_or(digest.as_str(), |(_, h)| h);
            return format!("@{}", hash);
        }
        if let Some(tag) = &self.tag {
            return format!(":{}", tag);
        }
        if let Some(semver) = &self.semver {
            return format!(":{}", semver);
        }
        if let Some(filter) = &self.semver_filter {
            return format!(":{}", filter);
        }
        String::new()
    }
}
