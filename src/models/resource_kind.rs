//! Resource kind definitions
//!
//! Centralizes the kinds the tree gives special treatment to, so kind strings
//! are not hardcoded throughout the codebase. Kinds outside this set are still
//! valid tree nodes; they just carry no kind-specific metadata.

use std::fmt;
use std::str::FromStr;

/// Kinds with dedicated handling in the tree, decoder or graph projection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    // Flux applications
    Kustomization,
    HelmRelease,
    HelmChart,
    // Flux sources
    GitRepository,
    OCIRepository,
    HelmRepository,
    Bucket,
    // Workloads and storage
    Deployment,
    Pod,
    PersistentVolumeClaim,
    // Cluster-scoped noise excluded from graphs by default
    ClusterRole,
    ClusterRoleBinding,
    CustomResourceDefinition,
}

impl ResourceKind {
    /// Get the kind as it appears on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Kustomization => "Kustomization",
            ResourceKind::HelmRelease => "HelmRelease",
            ResourceKind::HelmChart => "HelmChart",
            ResourceKind::GitRepository => "GitRepository",
            ResourceKind::OCIRepository => "OCIRepository",
            ResourceKind::HelmRepository => "HelmRepository",
            ResourceKind::Bucket => "Bucket",
            ResourceKind::Deployment => "Deployment",
            ResourceKind::Pod => "Pod",
            ResourceKind::PersistentVolumeClaim => "PersistentVolumeClaim",
            ResourceKind::ClusterRole => "ClusterRole",
            ResourceKind::ClusterRoleBinding => "ClusterRoleBinding",
            ResourceKind::CustomResourceDefinition => "CustomResourceDefinition",
        }
    }

    /// Try to parse a kind string, returning None for kinds without special handling
    pub fn parse_optional(s: &str) -> Option<Self> {
        s.parse().ok()
    }

    /// Kinds shown in the applications view
    pub fn is_application(&self) -> bool {
        matches!(
            self,
            ResourceKind::Kustomization | ResourceKind::HelmRelease | ResourceKind::HelmChart
        )
    }

    /// Kinds shown in the repositories view
    pub fn is_repository(&self) -> bool {
        matches!(
            self,
            ResourceKind::OCIRepository
                | ResourceKind::HelmRepository
                | ResourceKind::GitRepository
                | ResourceKind::Bucket
        )
    }

    /// Kinds that bound a graph: nested ones render collapsed in their parent's graph
    pub fn is_application_boundary(&self) -> bool {
        matches!(self, ResourceKind::Kustomization | ResourceKind::HelmRelease)
    }

    /// Kinds that accept reconcile/suspend/resume and carry Flux metadata
    pub fn is_reconcilable(&self) -> bool {
        matches!(
            self,
            ResourceKind::Kustomization
                | ResourceKind::HelmRelease
                | ResourceKind::HelmChart
                | ResourceKind::HelmRepository
                | ResourceKind::GitRepository
                | ResourceKind::OCIRepository
        )
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<ResourceKind> for String {
    fn from(kind: ResourceKind) -> Self {
        kind.as_str().to_string()
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Kustomization" => Ok(ResourceKind::Kustomization),
            "HelmRelease" => Ok(ResourceKind::HelmRelease),
            "HelmChart" => Ok(ResourceKind::HelmChart),
            "GitRepository" => Ok(ResourceKind::GitRepository),
            "OCIRepository" => Ok(ResourceKind::OCIRepository),
            "HelmRepository" => Ok(ResourceKind::HelmRepository),
            "Bucket" => Ok(ResourceKind::Bucket),
            "Deployment" => Ok(ResourceKind::Deployment),
            "Pod" => Ok(ResourceKind::Pod),
            "PersistentVolumeClaim" => Ok(ResourceKind::PersistentVolumeClaim),
            "ClusterRole" => Ok(ResourceKind::ClusterRole),
            "ClusterRoleBinding" => Ok(ResourceKind::ClusterRoleBinding),
            "CustomResourceDefinition" => Ok(ResourceKind::CustomResourceDefinition),
            _ => Err(format!("Unknown resource kind: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_str_round_trips_through_parse() {
        for kind in [
            ResourceKind::Kustomization,
            ResourceKind::OCIRepository,
            ResourceKind::PersistentVolumeClaim,
            ResourceKind::CustomResourceDefinition,
        ] {
            assert_eq!(ResourceKind::parse_optional(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn test_unknown_kind() {
        assert_eq!(ResourceKind::parse_optional("Service"), None);
        assert_eq!(ResourceKind::parse_optional("kustomization"), None);
    }

    #[test]
    fn test_kind_sets() {
        assert!(ResourceKind::HelmChart.is_application());
        assert!(!ResourceKind::HelmChart.is_application_boundary());
        assert!(ResourceKind::Bucket.is_repository());
        assert!(!ResourceKind::Bucket.is_reconcilable());
        assert!(ResourceKind::OCIRepository.is_reconcilable());
        assert!(!ResourceKind::Pod.is_reconcilable());
    }

    #[test]
    fn test_into_string() {
        let s: String = ResourceKind::HelmRelease.into();
        assert_eq!(s, "HelmRelease");
    }
}
