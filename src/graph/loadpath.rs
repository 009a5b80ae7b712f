//! Load-path assembly.
//!
//! Walks a resolved graph and produces the ordered, deduplicated list of
//! binaries the execution context will search. Ordering matters: the root
//! artifact must win over any transitively included artifact sharing a
//! logical path, and a first-declared dependency wins over later duplicates.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::coordinate::Coordinate;
use crate::core::errors::{LaunchError, Result};
use crate::graph::ResolvedGraph;

/// Ordered sequence of resolved binary locations. Never empty: the root
/// artifact is always at index 0, and no resolved file appears twice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadPath {
    entries: Vec<PathBuf>,
}

impl LoadPath {
    /// The root component's artifact.
    pub fn root(&self) -> &Path {
        &self.entries[0]
    }

    pub fn entries(&self) -> &[PathBuf] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.entries.iter().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        // Holds by construction; kept for the usual pairing with len().
        self.entries.is_empty()
    }
}

/// Assemble the load path for `root`, whose own binary is `root_artifact`.
///
/// The graph is walked in its insertion order. A node with a resolved file
/// is appended unless that file is already present. A node without one is
/// fatal, except when its key equals the root's: the root component is
/// represented only by `root_artifact` and its graph node is skipped.
pub fn assemble(
    root: &Coordinate,
    root_artifact: &Path,
    graph: &ResolvedGraph,
) -> Result<LoadPath> {
    let root_key = root.key();
    let mut entries = vec![root_artifact.to_path_buf()];
    let mut seen: HashSet<PathBuf> = HashSet::new();
    seen.insert(root_artifact.to_path_buf());

    for node in graph.nodes() {
        match &node.resolved_file {
            Some(file) => {
                if seen.insert(file.clone()) {
                    entries.push(file.clone());
                }
            }
            None if node.key == root_key => continue,
            None => return Err(LaunchError::UnresolvedDependency(node.key.clone())),
        }
    }

    debug!(
        root = %root_key,
        entries = entries.len(),
        "assembled load path"
    );
    Ok(LoadPath { entries })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{DependencyNode, Scope};
    use pretty_assertions::assert_eq;

    fn coordinate() -> Coordinate {
        "org:app:1.0".parse().unwrap()
    }

    fn graph_with(nodes: Vec<DependencyNode>) -> ResolvedGraph {
        let mut graph = ResolvedGraph::new(DependencyNode::unresolved("org:app:1.0"));
        let mut previous = graph.root_index();
        for node in nodes {
            let index = graph.add_node(node);
            graph.add_dependency(previous, index, Scope::Compile);
            previous = index;
        }
        graph
    }

    #[test]
    fn test_root_is_first_and_counts_match() {
        let graph = graph_with(vec![
            DependencyNode::resolved("org:a:1.0", "/repo/a.so"),
            DependencyNode::resolved("org:b:1.0", "/repo/b.so"),
        ]);
        let path = assemble(&coordinate(), Path::new("/repo/app.so"), &graph).unwrap();
        assert_eq!(
            path.entries(),
            &[
                PathBuf::from("/repo/app.so"),
                PathBuf::from("/repo/a.so"),
                PathBuf::from("/repo/b.so"),
            ]
        );
        assert_eq!(path.root(), Path::new("/repo/app.so"));
        assert!(!path.is_empty());
    }

    #[test]
    fn test_unresolved_root_node_is_skipped() {
        // The graph's own node for the root has no file; only the separately
        // resolved root artifact represents it.
        let graph = graph_with(vec![DependencyNode::resolved("org:a:1.0", "/repo/a.so")]);
        let path = assemble(&coordinate(), Path::new("/repo/app.so"), &graph).unwrap();
        assert_eq!(path.len(), 2);
    }

    #[test]
    fn test_unresolved_dependency_is_fatal() {
        let graph = graph_with(vec![
            DependencyNode::resolved("org:a:1.0", "/repo/a.so"),
            DependencyNode::unresolved("org:lib:2.0"),
        ]);
        let err = assemble(&coordinate(), Path::new("/repo/app.so"), &graph).unwrap_err();
        match err {
            LaunchError::UnresolvedDependency(key) => assert_eq!(key, "org:lib:2.0"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_dedup_first_occurrence_wins() {
        // Two distinct keys resolving to the same binary keep one entry, in
        // first-declared position.
        let graph = graph_with(vec![
            DependencyNode::resolved("org:a:1.0", "/repo/shared.so"),
            DependencyNode::resolved("org:b:1.0", "/repo/b.so"),
            DependencyNode::resolved("org:a-relocated:1.0", "/repo/shared.so"),
        ]);
        let path = assemble(&coordinate(), Path::new("/repo/app.so"), &graph).unwrap();
        assert_eq!(
            path.entries(),
            &[
                PathBuf::from("/repo/app.so"),
                PathBuf::from("/repo/shared.so"),
                PathBuf::from("/repo/b.so"),
            ]
        );
    }

    #[test]
    fn test_node_duplicating_root_artifact_is_dropped() {
        let graph = graph_with(vec![
            DependencyNode::resolved("org:app-classifier:1.0", "/repo/app.so"),
            DependencyNode::resolved("org:a:1.0", "/repo/a.so"),
        ]);
        let path = assemble(&coordinate(), Path::new("/repo/app.so"), &graph).unwrap();
        assert_eq!(path.len(), 2);
        assert_eq!(path.root(), Path::new("/repo/app.so"));
    }

    #[test]
    fn test_idempotent() {
        let graph = graph_with(vec![
            DependencyNode::resolved("org:a:1.0", "/repo/a.so"),
            DependencyNode::resolved("org:b:1.0", "/repo/b.so"),
        ]);
        let first = assemble(&coordinate(), Path::new("/repo/app.so"), &graph).unwrap();
        let second = assemble(&coordinate(), Path::new("/repo/app.so"), &graph).unwrap();
        assert_eq!(first, second);
    }
}
