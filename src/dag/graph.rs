// src/dag/graph.rs

use std::collections::BTreeMap;

use crate::engine::TaskName;

/// Internal node structure: direct dependencies, in declaration order.
#[derive(Debug, Clone)]
struct DagNode {
    deps: Vec<TaskName>,
}

/// Simple in-memory DAG representation keyed by task name.
///
/// This is intentionally lightweight; acyclicity is checked by
/// [`crate::dag::validate`] before a graph is executed, so here we only keep
/// adjacency information for scheduling and diagnostics.
#[derive(Debug, Clone, Default)]
pub struct DagGraph {
    nodes: BTreeMap<TaskName, DagNode>,
}

impl DagGraph {
    /// Build a DAG from `(name, deps)` pairs.
    ///
    /// Dependencies that do not name a node are kept as declared; validation
    /// reports them.
    pub fn from_edges<'a, I>(edges: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a [TaskName])>,
    {
        let nodes = edges
            .into_iter()
            .map(|(name, deps)| (name.to_string(), DagNode { deps: deps.to_vec() }))
            .collect();

        Self { nodes }
    }

    /// Return all task names, sorted.
    pub fn tasks(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(|s| s.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    /// Immediate dependencies of a task.
    pub fn dependencies_of(&self, name: &str) -> &[TaskName] {
        self.nodes
            .get(name)
            .map(|n| n.deps.as_slice())
            .unwrap_or(&[])
    }
}
