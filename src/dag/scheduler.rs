use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::dag::graph::DagGraph;
use crate::dag::scheduler_step::SchedulerStep;
use crate::dag::state_manager::StateManager;
use crate::dag::task_info::{ScheduledTask, TaskInfo, TaskState};
use crate::engine::{TaskName, TaskOutcome};

/// Scheduler holds the immutable DAG plus mutable per-execution state.
///
/// It is responsible for:
/// - deciding when a pending task is ready (all deps succeeded)
/// - marking tasks as succeeded/failed
/// - aborting the run on the first failure: every pending task is skipped,
///   running tasks are left to finish
///
/// It performs no IO; the engine drives it with completion outcomes.
#[derive(Debug)]
pub struct Scheduler {
    tasks: HashMap<TaskName, TaskInfo>,
    /// First task that failed, if any.
    failed_task: Option<TaskName>,
}

impl Scheduler {
    /// Construct a scheduler for a validated graph. All tasks start `Pending`.
    pub fn new(graph: DagGraph) -> Self {
        let tasks = graph
            .tasks()
            .map(|name| {
                let deps = graph.dependencies_of(name).to_vec();
                (name.to_string(), TaskInfo::new(name.to_string(), deps))
            })
            .collect();

        Self {
            tasks,
            failed_task: None,
        }
    }

    pub fn state_of(&self, task: &str) -> Option<TaskState> {
        self.tasks.get(task).map(|info| info.state)
    }

    /// Whether a failure has aborted this run.
    pub fn is_aborted(&self) -> bool {
        self.failed_task.is_some()
    }

    /// True once every task is succeeded, failed or skipped.
    pub fn is_finished(&self) -> bool {
        self.tasks.values().all(|info| info.state.is_terminal())
    }

    /// Names of tasks currently `Running`, sorted.
    pub fn running(&self) -> Vec<TaskName> {
        let mut names: Vec<TaskName> = self
            .tasks
            .values()
            .filter(|info| info.state == TaskState::Running)
            .map(|info| info.name.clone())
            .collect();
        names.sort();
        names
    }

    /// Handle the start of execution: schedules every root task.
    pub fn start(&mut self) -> Vec<ScheduledTask> {
        debug!(tasks = self.tasks.len(), "scheduler: starting graph execution");
        StateManager::new(&mut self.tasks).collect_new_ready_tasks()
    }

    /// Handle completion of a task with a concrete outcome.
    pub fn handle_completion(&mut self, task: &str, outcome: TaskOutcome) -> Vec<ScheduledTask> {
        self.step_completion(task, outcome).newly_scheduled
    }

    /// Manual-step variant of [`Scheduler::handle_completion`].
    pub fn step_completion(&mut self, task: &str, outcome: TaskOutcome) -> SchedulerStep {
        let mut step = SchedulerStep::default();

        let Some(info) = self.tasks.get_mut(task) else {
            warn!(task = %task, "completion for unknown task; ignoring");
            return step;
        };

        if info.state != TaskState::Running {
            warn!(
                task = %task,
                state = ?info.state,
                "completion for task that is not running; ignoring"
            );
            return step;
        }

        match outcome {
            TaskOutcome::Success => {
                info.state = TaskState::Succeeded;
                debug!(task = %task, "task completed successfully");
            }
            TaskOutcome::Failed => {
                info.state = TaskState::Failed;
                if self.failed_task.is_none() {
                    warn!(task = %task, "task failed; aborting run");
                    self.failed_task = Some(task.to_string());
                } else {
                    debug!(task = %task, "task failed after the run was already aborted");
                }
            }
        }

        let mut manager = StateManager::new(&mut self.tasks);
        if self.failed_task.is_some() {
            step.newly_skipped = manager.skip_all_pending();
        } else {
            step.newly_scheduled = manager.collect_new_ready_tasks();
        }

        if manager.all_tasks_terminal() {
            info!(
                aborted = self.failed_task.is_some(),
                "scheduler: all tasks terminal"
            );
        }

        step
    }
}
