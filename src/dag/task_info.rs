// src/dag/task_info.rs

//! Per-task bookkeeping held by the scheduler.

use crate::engine::TaskName;

/// State of a task within one graph execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// Waiting on dependencies.
    Pending,
    /// Action dispatched and not yet completed.
    Running,
    Succeeded,
    Failed,
    /// Never started, because a dependency failed or the run was aborted.
    Skipped,
}

impl TaskState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TaskState::Succeeded | TaskState::Failed | TaskState::Skipped
        )
    }
}

/// Static task information plus its current state.
#[derive(Debug, Clone)]
pub struct TaskInfo {
    pub name: TaskName,
    /// Direct dependencies for this task.
    pub deps: Vec<TaskName>,
    pub state: TaskState,
}

impl TaskInfo {
    pub fn new(name: TaskName, deps: Vec<TaskName>) -> Self {
        Self {
            name,
            deps,
            state: TaskState::Pending,
        }
    }
}

/// Description of a task that the scheduler wants dispatched now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledTask {
    pub name: TaskName,
    pub deps: Vec<TaskName>,
}

impl ScheduledTask {
    pub fn from_task_info(info: &TaskInfo) -> Self {
        Self {
            name: info.name.clone(),
            deps: info.deps.clone(),
        }
    }
}
