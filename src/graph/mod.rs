//! Resolved dependency graphs.
//!
//! A [`ResolvedGraph`] is the root component's node plus the full transitive
//! closure its resolver selected, held in a [`DiGraph`] with scope-labelled
//! edges. Node iteration order is insertion order (the order dependencies
//! were declared and resolved), never a sorted order, because load-path
//! precedence depends on it.

pub mod loadpath;

use std::collections::HashMap;
use std::path::PathBuf;

use petgraph::algo::is_cyclic_directed;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};

use crate::core::errors::{LaunchError, Result};

/// Dependency scope of a graph edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    #[default]
    Compile,
    Runtime,
    Provided,
    Test,
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Scope::Compile => "compile",
            Scope::Runtime => "runtime",
            Scope::Provided => "provided",
            Scope::Test => "test",
        };
        f.write_str(name)
    }
}

/// Which dependency edges a graph resolver should follow.
///
/// The default policy excludes `test` and `provided` edges at every depth,
/// while everything reachable through the remaining compile/runtime edges
/// stays in the graph. With `transitive` off the exclusion only applies to
/// the root's direct dependencies.
#[derive(Debug, Clone)]
pub struct ScopePolicy {
    excluded: Vec<Scope>,
    transitive: bool,
}

impl ScopePolicy {
    pub fn new(excluded: Vec<Scope>, transitive: bool) -> Self {
        Self {
            excluded,
            transitive,
        }
    }

    /// Whether an edge with `scope` at `depth` (1 = direct dependency of the
    /// root) should be followed.
    pub fn selects(&self, scope: Scope, depth: usize) -> bool {
        if depth > 1 && !self.transitive {
            return true;
        }
        !self.excluded.contains(&scope)
    }
}

impl Default for ScopePolicy {
    fn default() -> Self {
        Self {
            excluded: vec![Scope::Test, Scope::Provided],
            transitive: true,
        }
    }
}

/// One resolved (or not yet resolved) component in the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyNode {
    /// Canonical `group:name:version` key.
    pub key: String,
    /// Location of the resolved binary, if resolution succeeded. A missing
    /// file is only an error once the load path is assembled, and only for
    /// nodes other than the root component itself.
    pub resolved_file: Option<PathBuf>,
}

impl DependencyNode {
    pub fn new(key: impl Into<String>, resolved_file: Option<PathBuf>) -> Self {
        Self {
            key: key.into(),
            resolved_file,
        }
    }

    pub fn resolved(key: impl Into<String>, file: impl Into<PathBuf>) -> Self {
        Self::new(key, Some(file.into()))
    }

    pub fn unresolved(key: impl Into<String>) -> Self {
        Self::new(key, None)
    }
}

/// The root component's node plus its transitive dependency closure.
#[derive(Debug, Clone)]
pub struct ResolvedGraph {
    dag: DiGraph<DependencyNode, Scope>,
    indices: HashMap<String, NodeIndex>,
    root: NodeIndex,
}

impl ResolvedGraph {
    /// Create a graph containing only the root node.
    pub fn new(root: DependencyNode) -> Self {
        let mut dag = DiGraph::new();
        let mut indices = HashMap::new();
        let key = root.key.clone();
        let index = dag.add_node(root);
        indices.insert(key, index);
        Self {
            dag,
            indices,
            root: index,
        }
    }

    /// Add a node, returning its index. Adding a key twice returns the
    /// existing node unchanged.
    pub fn add_node(&mut self, node: DependencyNode) -> NodeIndex {
        if let Some(&existing) = self.indices.get(&node.key) {
            return existing;
        }
        let key = node.key.clone();
        let index = self.dag.add_node(node);
        self.indices.insert(key, index);
        index
    }

    /// Record that `from` depends on `to` with the given scope.
    pub fn add_dependency(&mut self, from: NodeIndex, to: NodeIndex, scope: Scope) {
        self.dag.add_edge(from, to, scope);
    }

    pub fn root_index(&self) -> NodeIndex {
        self.root
    }

    pub fn root_key(&self) -> &str {
        &self.dag[self.root].key
    }

    pub fn index_of(&self, key: &str) -> Option<NodeIndex> {
        self.indices.get(key).copied()
    }

    pub fn node(&self, key: &str) -> Option<&DependencyNode> {
        self.index_of(key).map(|index| &self.dag[index])
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &DependencyNode> {
        self.dag.node_indices().map(move |index| &self.dag[index])
    }

    pub fn len(&self) -> usize {
        self.dag.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.dag.node_count() == 0
    }

    /// Fail if the recorded dependencies form a cycle.
    pub fn ensure_acyclic(&self) -> Result<()> {
        if is_cyclic_directed(&self.dag) {
            return Err(LaunchError::DependencyCycle(self.root_key().to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_graph() -> ResolvedGraph {
        let mut graph = ResolvedGraph::new(DependencyNode::unresolved("org:app:1.0"));
        let root = graph.root_index();
        let a = graph.add_node(DependencyNode::resolved("org:a:1.0", "/repo/a.so"));
        let b = graph.add_node(DependencyNode::resolved("org:b:1.0", "/repo/b.so"));
        graph.add_dependency(root, a, Scope::Compile);
        graph.add_dependency(a, b, Scope::Runtime);
        graph
    }

    #[test]
    fn test_insertion_order_iteration() {
        let graph = sample_graph();
        let keys: Vec<&str> = graph.nodes().map(|node| node.key.as_str()).collect();
        assert_eq!(keys, vec!["org:app:1.0", "org:a:1.0", "org:b:1.0"]);
    }

    #[test]
    fn test_duplicate_key_returns_existing_node() {
        let mut graph = sample_graph();
        let before = graph.len();
        let index = graph.add_node(DependencyNode::unresolved("org:a:1.0"));
        assert_eq!(graph.len(), before);
        assert_eq!(Some(index), graph.index_of("org:a:1.0"));
        // The original resolved file is kept.
        assert!(graph.node("org:a:1.0").unwrap().resolved_file.is_some());
    }

    #[test]
    fn test_cycle_detection() {
        let mut graph = sample_graph();
        assert!(graph.ensure_acyclic().is_ok());
        let root = graph.root_index();
        let b = graph.index_of("org:b:1.0").unwrap();
        graph.add_dependency(b, root, Scope::Compile);
        assert!(matches!(
            graph.ensure_acyclic(),
            Err(LaunchError::DependencyCycle(_))
        ));
    }

    #[test]
    fn test_scope_policy_default_excludes_test_and_provided() {
        let policy = ScopePolicy::default();
        assert!(policy.selects(Scope::Compile, 1));
        assert!(policy.selects(Scope::Runtime, 3));
        assert!(!policy.selects(Scope::Test, 1));
        assert!(!policy.selects(Scope::Provided, 2));
    }

    #[test]
    fn test_scope_policy_direct_only() {
        let policy = ScopePolicy::new(vec![Scope::Test], false);
        assert!(!policy.selects(Scope::Test, 1));
        assert!(policy.selects(Scope::Test, 2));
    }
}
