// src/dag/task.rs

//! User-facing task and task-graph definitions.
//!
//! A [`Task`] pairs a name and a dependency list with an async action. The
//! action receives a [`TaskResults`] holding the output of each of its
//! dependencies and produces an output of its own. Outputs are opaque to the
//! executor; it only stores them behind `Arc` and hands them to dependents.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use anyhow::anyhow;

use crate::dag::graph::DagGraph;
use crate::dag::validate::validate_graph;
use crate::engine::TaskName;
use crate::errors::Result;

/// Future returned by a task action.
pub type TaskFuture<T> = Pin<Box<dyn Future<Output = anyhow::Result<T>> + Send>>;

/// A boxed, run-once task action.
pub type TaskAction<T> = Box<dyn FnOnce(TaskResults<T>) -> TaskFuture<T> + Send>;

/// Outputs of completed tasks, keyed by task name.
///
/// Handed to an action with one entry per dependency, and returned by the
/// executor with one entry per task.
pub struct TaskResults<T> {
    results: HashMap<TaskName, Arc<T>>,
}

impl<T> TaskResults<T> {
    pub fn new() -> Self {
        Self {
            results: HashMap::new(),
        }
    }

    pub(crate) fn insert(&mut self, name: TaskName, value: Arc<T>) {
        self.results.insert(name, value);
    }

    /// Output of the named task, or an error if it is not present.
    pub fn get(&self, name: &str) -> anyhow::Result<&T> {
        self.results
            .get(name)
            .map(|v| v.as_ref())
            .ok_or_else(|| anyhow!("no result for task '{name}'"))
    }

    /// Shared handle to the named output.
    pub fn get_arc(&self, name: &str) -> Option<Arc<T>> {
        self.results.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.results.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Task names present, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.results.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}

impl<T> Default for TaskResults<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for TaskResults<T> {
    fn clone(&self) -> Self {
        Self {
            results: self.results.clone(),
        }
    }
}

impl<T> fmt::Debug for TaskResults<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskResults")
            .field("tasks", &self.names())
            .finish()
    }
}

/// A named unit of work.
pub struct Task<T> {
    name: TaskName,
    deps: Vec<TaskName>,
    action: TaskAction<T>,
}

impl<T> fmt::Debug for Task<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name)
            .field("deps", &self.deps)
            .finish_non_exhaustive()
    }
}

impl<T: Send + Sync + 'static> Task<T> {
    /// Create a task.
    ///
    /// ```ignore
    /// let t = Task::new("compile", &["files"], |deps| async move {
    ///     let files = deps.get("files")?;
    ///     Ok(files.len())
    /// });
    /// ```
    pub fn new<N, F, Fut>(name: N, deps: &[&str], action: F) -> Self
    where
        N: Into<TaskName>,
        F: FnOnce(TaskResults<T>) -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
    {
        Self {
            name: name.into(),
            deps: deps.iter().map(|d| d.to_string()).collect(),
            action: Box::new(move |inputs| -> TaskFuture<T> { Box::pin(action(inputs)) }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn deps(&self) -> &[TaskName] {
        &self.deps
    }
}

/// Mapping from task name to [`Task`]; one per pipeline run.
pub struct TaskGraph<T> {
    tasks: BTreeMap<TaskName, Task<T>>,
    /// Names added more than once; reported by [`TaskGraph::validate`].
    duplicates: Vec<TaskName>,
}

impl<T> fmt::Debug for TaskGraph<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskGraph")
            .field("tasks", &self.tasks.values().collect::<Vec<_>>())
            .finish()
    }
}

impl<T> Default for TaskGraph<T> {
    fn default() -> Self {
        Self {
            tasks: BTreeMap::new(),
            duplicates: Vec::new(),
        }
    }
}

impl<T: Send + Sync + 'static> TaskGraph<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a task. A second task with the same name is remembered as a
    /// duplicate and fails validation; the first one is kept.
    pub fn add(&mut self, task: Task<T>) -> &mut Self {
        if self.tasks.contains_key(&task.name) {
            self.duplicates.push(task.name.clone());
        } else {
            self.tasks.insert(task.name.clone(), task);
        }
        self
    }

    /// Builder-style variant of [`TaskGraph::add`].
    pub fn with(mut self, task: Task<T>) -> Self {
        self.add(task);
        self
    }

    pub fn task_names(&self) -> impl Iterator<Item = &str> {
        self.tasks.keys().map(|s| s.as_str())
    }

    /// Adjacency view of this graph.
    pub fn dag(&self) -> DagGraph {
        DagGraph::from_edges(
            self.tasks
                .values()
                .map(|t| (t.name.as_str(), t.deps.as_slice())),
        )
    }

    /// Check for duplicate names, unknown dependencies and cycles.
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = self.duplicates.first() {
            return Err(crate::errors::TbwatchError::DuplicateTask(name.clone()));
        }
        validate_graph(&self.dag())
    }

    /// Split the graph into its adjacency view and the run-once actions.
    pub(crate) fn into_parts(self) -> (DagGraph, HashMap<TaskName, TaskAction<T>>) {
        let dag = self.dag();
        let actions = self
            .tasks
            .into_iter()
            .map(|(name, task)| (name, task.action))
            .collect();
        (dag, actions)
    }
}
