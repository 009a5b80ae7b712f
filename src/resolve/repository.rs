//! File-based component repository.
//!
//! Layout: `<root>/<group>/<name>/<version>/component.yaml` describes a
//! component; its artifact sits in the same directory. The repository
//! implements the three resolution collaborators the launcher needs, so a
//! directory tree is all it takes to launch something.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use petgraph::graph::NodeIndex;
use tracing::{debug, warn};

use crate::coordinate::Coordinate;
use crate::core::errors::{LaunchError, Result};
use crate::graph::{DependencyNode, ResolvedGraph, ScopePolicy};
use crate::resolve::{ArtifactResolver, GraphResolver, ProjectDescriptor, ProjectLoader};

const DESCRIPTOR_FILE: &str = "component.yaml";

/// A component repository rooted at a local directory.
#[derive(Debug, Clone)]
pub struct LocalRepository {
    root: PathBuf,
}

impl LocalRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn component_dir(&self, coordinate: &Coordinate) -> PathBuf {
        self.root
            .join(coordinate.group())
            .join(coordinate.name())
            .join(coordinate.version())
    }

    /// Artifact file name: the descriptor's explicit name, else the platform
    /// dylib name derived from the component name.
    fn artifact_name(descriptor: &ProjectDescriptor) -> String {
        match &descriptor.artifact {
            Some(name) => name.clone(),
            None => format!(
                "{}{}{}",
                std::env::consts::DLL_PREFIX,
                descriptor.coordinate.name().replace('-', "_"),
                std::env::consts::DLL_SUFFIX
            ),
        }
    }

    fn read_descriptor(&self, coordinate: &Coordinate) -> Result<ProjectDescriptor> {
        let path = self.component_dir(coordinate).join(DESCRIPTOR_FILE);
        let text = fs::read_to_string(&path).map_err(|e| {
            LaunchError::project_load(
                coordinate.key(),
                format!("cannot read {}: {}", path.display(), e),
            )
        })?;
        let descriptor: ProjectDescriptor =
            serde_yaml::from_str(&text).map_err(|source| LaunchError::Descriptor {
                path: path.clone(),
                source,
            })?;
        if descriptor.coordinate != *coordinate {
            return Err(LaunchError::project_load(
                coordinate.key(),
                format!(
                    "descriptor {} names {} instead",
                    path.display(),
                    descriptor.coordinate.key()
                ),
            ));
        }
        Ok(descriptor)
    }

    /// Resolve a node's artifact, leaving it unresolved when the file is
    /// absent. Only load-path assembly decides whether that is fatal.
    fn try_resolve_file(&self, descriptor: &ProjectDescriptor) -> Option<PathBuf> {
        let path = self
            .component_dir(&descriptor.coordinate)
            .join(Self::artifact_name(descriptor));
        if path.is_file() {
            Some(path)
        } else {
            warn!(key = %descriptor.coordinate.key(), "artifact file missing, leaving node unresolved");
            None
        }
    }

    fn walk(
        &self,
        descriptor: &ProjectDescriptor,
        from: NodeIndex,
        depth: usize,
        policy: &ScopePolicy,
        graph: &mut ResolvedGraph,
        visited: &mut HashSet<String>,
    ) -> Result<()> {
        for dependency in &descriptor.dependencies {
            if !policy.selects(dependency.scope, depth) {
                debug!(
                    key = %dependency.coordinate.key(),
                    scope = %dependency.scope,
                    "scope policy excluded dependency"
                );
                continue;
            }

            let key = dependency.coordinate.key();
            if visited.contains(&key) {
                if let Some(index) = graph.index_of(&key) {
                    graph.add_dependency(from, index, dependency.scope);
                }
                continue;
            }
            visited.insert(key.clone());

            // Missing metadata breaks graph construction outright; a missing
            // artifact file merely leaves the node unresolved.
            let child = self.read_descriptor(&dependency.coordinate).map_err(|e| {
                LaunchError::dependency_resolution(descriptor.coordinate.key(), e)
            })?;
            let node = DependencyNode::new(key, self.try_resolve_file(&child));
            let index = graph.add_node(node);
            graph.add_dependency(from, index, dependency.scope);
            self.walk(&child, index, depth + 1, policy, graph, visited)?;
        }
        Ok(())
    }
}

impl ProjectLoader for LocalRepository {
    fn load(&self, coordinate: &Coordinate) -> Result<ProjectDescriptor> {
        self.read_descriptor(coordinate)
    }
}

impl GraphResolver for LocalRepository {
    fn resolve(&self, project: &ProjectDescriptor, policy: &ScopePolicy) -> Result<ResolvedGraph> {
        debug!(root = %project.coordinate.key(), "resolving dependency graph");
        // The root's node carries no file: the root artifact is resolved
        // separately and the assembler skips this node by key.
        let mut graph = ResolvedGraph::new(DependencyNode::unresolved(project.coordinate.key()));
        let mut visited = HashSet::new();
        visited.insert(project.coordinate.key());
        let root = graph.root_index();
        self.walk(project, root, 1, policy, &mut graph, &mut visited)?;
        graph.ensure_acyclic()?;
        debug!(nodes = graph.len(), "dependency graph resolved");
        Ok(graph)
    }
}

impl ArtifactResolver for LocalRepository {
    fn resolve_file(&self, coordinate: &Coordinate) -> Result<PathBuf> {
        let descriptor = self
            .read_descriptor(coordinate)
            .map_err(|e| LaunchError::artifact_resolution(coordinate.key(), e))?;
        self.try_resolve_file(&descriptor).ok_or_else(|| {
            LaunchError::artifact_resolution(
                coordinate.key(),
                format!(
                    "artifact file '{}' not found in {}",
                    Self::artifact_name(&descriptor),
                    self.component_dir(coordinate).display()
                ),
            )
        })
    }
}
