//! Resolution collaborators.
//!
//! The launcher does not know how project metadata is stored, how graphs
//! are computed or where artifacts live; it consumes these traits. A
//! file-based implementation backed by a local directory layout lives in
//! [`repository`].

pub mod repository;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::coordinate::Coordinate;
use crate::core::errors::Result;
use crate::graph::{ResolvedGraph, Scope, ScopePolicy};

/// One declared dependency of a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencySpec {
    pub coordinate: Coordinate,
    #[serde(default)]
    pub scope: Scope,
}

/// Project metadata for a coordinate: the component's own artifact plus its
/// declared dependencies, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectDescriptor {
    pub coordinate: Coordinate,
    /// Artifact file name within the component's repository directory. When
    /// absent a platform dylib name is derived from the component name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact: Option<String>,
    #[serde(default)]
    pub dependencies: Vec<DependencySpec>,
}

/// Loads project metadata for a coordinate.
pub trait ProjectLoader {
    fn load(&self, coordinate: &Coordinate) -> Result<ProjectDescriptor>;
}

/// Computes the dependency graph of a project, resolving each selected node
/// to an artifact file where possible. Nodes whose artifact cannot be found
/// are left unresolved; reporting them is the load-path assembler's job.
pub trait GraphResolver {
    fn resolve(&self, project: &ProjectDescriptor, policy: &ScopePolicy) -> Result<ResolvedGraph>;
}

/// Resolves a coordinate to its artifact file on disk.
pub trait ArtifactResolver {
    fn resolve_file(&self, coordinate: &Coordinate) -> Result<PathBuf>;
}

/// Reads the entry-type attribute embedded in an artifact, if any.
pub trait ManifestReader {
    fn read_entry_type(&self, artifact: &Path) -> Result<Option<String>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_yaml_round_trip() {
        let yaml = r#"
coordinate: org:example-app:1.0
artifact: libexample_app.so
dependencies:
  - coordinate: org:lib:2.0
  - coordinate: org:helper:0.3
    scope: runtime
  - coordinate: org:harness:1.1
    scope: test
"#;
        let descriptor: ProjectDescriptor = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(descriptor.coordinate.key(), "org:example-app:1.0");
        assert_eq!(descriptor.artifact.as_deref(), Some("libexample_app.so"));
        assert_eq!(descriptor.dependencies.len(), 3);
        assert_eq!(descriptor.dependencies[0].scope, Scope::Compile);
        assert_eq!(descriptor.dependencies[1].scope, Scope::Runtime);
        assert_eq!(descriptor.dependencies[2].scope, Scope::Test);
    }

    #[test]
    fn test_descriptor_minimal() {
        let descriptor: ProjectDescriptor =
            serde_yaml::from_str("coordinate: org:tiny:0.1\n").unwrap();
        assert!(descriptor.artifact.is_none());
        assert!(descriptor.dependencies.is_empty());
    }
}
