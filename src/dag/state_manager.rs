// src/dag/state_manager.rs

//! State transitions for tasks in the scheduler.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::dag::task_info::{ScheduledTask, TaskInfo, TaskState};
use crate::engine::TaskName;

/// Manages state transitions over the scheduler's task map.
pub struct StateManager<'a> {
    tasks: &'a mut HashMap<TaskName, TaskInfo>,
}

impl<'a> StateManager<'a> {
    pub fn new(tasks: &'a mut HashMap<TaskName, TaskInfo>) -> Self {
        Self { tasks }
    }

    /// Collect tasks that are `Pending` and whose dependencies have all
    /// succeeded, mark them `Running`, and return them sorted by name.
    pub fn collect_new_ready_tasks(&mut self) -> Vec<ScheduledTask> {
        // Decide first, then mutate to avoid borrowing issues.
        let tasks: &HashMap<TaskName, TaskInfo> = self.tasks;
        let mut candidates: Vec<TaskName> = tasks
            .values()
            .filter(|info| info.state == TaskState::Pending && deps_satisfied(tasks, info))
            .map(|info| info.name.clone())
            .collect();
        candidates.sort();

        let mut ready = Vec::with_capacity(candidates.len());
        for name in candidates {
            if let Some(info) = self.tasks.get_mut(&name) {
                debug!(task = %info.name, "dependencies satisfied; marking Running");
                info.state = TaskState::Running;
                ready.push(ScheduledTask::from_task_info(info));
            }
        }

        ready
    }

    /// Mark every `Pending` task as `Skipped`. Returns the names, sorted.
    pub fn skip_all_pending(&mut self) -> Vec<TaskName> {
        let mut skipped: Vec<TaskName> = self
            .tasks
            .values_mut()
            .filter(|info| info.state == TaskState::Pending)
            .map(|info| {
                info.state = TaskState::Skipped;
                debug!(task = %info.name, "run aborted; skipping task");
                info.name.clone()
            })
            .collect();
        skipped.sort();
        skipped
    }

    /// Check if all tasks are in a terminal state.
    pub fn all_tasks_terminal(&self) -> bool {
        self.tasks.values().all(|info| info.state.is_terminal())
    }
}

/// Whether every dependency of `info` has succeeded.
fn deps_satisfied(tasks: &HashMap<TaskName, TaskInfo>, info: &TaskInfo) -> bool {
    info.deps.iter().all(|dep_name| match tasks.get(dep_name) {
        Some(dep) => dep.state == TaskState::Succeeded,
        None => {
            warn!(
                task = %info.name,
                dep = %dep_name,
                "dependency missing from tasks map"
            );
            false
        }
    })
}
