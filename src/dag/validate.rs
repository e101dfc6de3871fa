// src/dag/validate.rs

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::dag::graph::DagGraph;
use crate::errors::{Result, TbwatchError};

/// Validate a task graph before anything runs: every dependency must name a
/// task in the graph, no task may depend on itself, and there must be no
/// cycles.
pub fn validate_graph(graph: &DagGraph) -> Result<()> {
    validate_task_dependencies(graph)?;
    validate_acyclic(graph)?;
    Ok(())
}

fn validate_task_dependencies(graph: &DagGraph) -> Result<()> {
    for name in graph.tasks() {
        for dep in graph.dependencies_of(name) {
            if dep == name {
                return Err(TbwatchError::DagCycle(format!(
                    "task '{}' depends on itself",
                    name
                )));
            }
            if !graph.contains(dep) {
                return Err(TbwatchError::UnknownDependency {
                    task: name.to_string(),
                    dependency: dep.clone(),
                });
            }
        }
    }
    Ok(())
}

fn validate_acyclic(graph: &DagGraph) -> Result<()> {
    // Edge direction: dep -> task.
    let mut g: DiGraphMap<&str, ()> = DiGraphMap::new();

    for name in graph.tasks() {
        g.add_node(name);
    }

    for name in graph.tasks() {
        for dep in graph.dependencies_of(name) {
            g.add_edge(dep.as_str(), name, ());
        }
    }

    // A topological sort will fail if there is a cycle.
    match toposort(&g, None) {
        Ok(_order) => Ok(()),
        Err(cycle) => Err(TbwatchError::DagCycle(format!(
            "cycle detected in task graph involving task '{}'",
            cycle.node_id()
        ))),
    }
}
