// src/engine/core.rs

//! Pure core runtime state machine.
//!
//! This module contains a synchronous, deterministic "core runtime" that
//! consumes [`RuntimeEvent`]s and produces:
//! - an updated core state (scheduler + result mapping)
//! - a list of "commands" describing what the IO shell should do next
//!
//! The async shell (`engine::runtime::Runtime`) is responsible for:
//! - spawning task actions
//! - reading completion events from the channel
//!
//! The result mapping is only ever mutated here; tasks receive snapshots of
//! their dependencies' results.

use std::fmt;
use std::sync::Arc;

use anyhow::anyhow;
use tracing::{debug, warn};

use crate::dag::{ScheduledTask, Scheduler, TaskResults, TaskState};
use crate::engine::{RuntimeEvent, TaskName, TaskOutcome};
use crate::errors::{Result, TbwatchError};

/// A task the shell should start, with the results of its dependencies.
pub struct Dispatch<T> {
    pub task: ScheduledTask,
    pub inputs: TaskResults<T>,
}

impl<T> fmt::Debug for Dispatch<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatch")
            .field("task", &self.task)
            .field("inputs", &self.inputs)
            .finish()
    }
}

/// Command produced by the pure core, to be executed by the outer IO shell.
#[derive(Debug)]
pub enum CoreCommand<T> {
    /// Start these tasks.
    DispatchTasks(Vec<Dispatch<T>>),
}

/// Decision returned by the core after handling a single event.
#[derive(Debug)]
pub struct CoreStep<T> {
    /// Commands the IO shell should execute.
    pub commands: Vec<CoreCommand<T>>,
    /// Whether the outer loop should keep waiting for completions.
    pub keep_running: bool,
}

/// Pure core runtime state.
///
/// It has **no** channels, no Tokio types, and does not perform any IO.
pub struct CoreRuntime<T> {
    scheduler: Scheduler,
    results: TaskResults<T>,
    /// First failure of the run; later ones are only logged.
    failure: Option<(TaskName, anyhow::Error)>,
}

impl<T> fmt::Debug for CoreRuntime<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoreRuntime")
            .field("scheduler", &self.scheduler)
            .field("results", &self.results)
            .finish_non_exhaustive()
    }
}

impl<T> CoreRuntime<T> {
    pub fn new(scheduler: Scheduler) -> Self {
        Self {
            scheduler,
            results: TaskResults::new(),
            failure: None,
        }
    }

    /// Read-only access to the scheduler (for tests and diagnostics).
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Begin execution: dispatch every task without dependencies.
    pub fn start(&mut self) -> CoreStep<T> {
        let ready = self.scheduler.start();
        self.make_step(ready)
    }

    /// Handle a single runtime event, updating core state and returning the
    /// resulting commands for the IO shell.
    pub fn step(&mut self, event: RuntimeEvent<T>) -> CoreStep<T> {
        match event {
            RuntimeEvent::TaskCompleted { task, result } => self.handle_completion(task, result),
        }
    }

    fn handle_completion(&mut self, task: TaskName, result: anyhow::Result<T>) -> CoreStep<T> {
        let was_running = self.scheduler.state_of(&task) == Some(TaskState::Running);
        let aborted = self.scheduler.is_aborted();

        let outcome = match result {
            Ok(value) => {
                if was_running && !aborted {
                    self.results.insert(task.clone(), Arc::new(value));
                } else if aborted {
                    debug!(task = %task, "run already aborted; discarding result");
                }
                TaskOutcome::Success
            }
            Err(err) => {
                if was_running && self.failure.is_none() {
                    self.failure = Some((task.clone(), err));
                } else {
                    warn!(
                        task = %task,
                        error = %format!("{err:#}"),
                        "additional task failure after abort"
                    );
                }
                TaskOutcome::Failed
            }
        };

        let step = self.scheduler.step_completion(&task, outcome);
        if !step.newly_skipped.is_empty() {
            debug!(skipped = ?step.newly_skipped, "tasks skipped after failure");
        }
        self.make_step(step.newly_scheduled)
    }

    fn make_step(&self, ready: Vec<ScheduledTask>) -> CoreStep<T> {
        let mut commands = Vec::new();

        if !ready.is_empty() {
            let dispatches = ready
                .into_iter()
                .map(|task| {
                    let mut inputs = TaskResults::new();
                    for dep in &task.deps {
                        if let Some(value) = self.results.get_arc(dep) {
                            inputs.insert(dep.clone(), value);
                        }
                    }
                    Dispatch { task, inputs }
                })
                .collect();
            commands.push(CoreCommand::DispatchTasks(dispatches));
        }

        CoreStep {
            commands,
            keep_running: !self.scheduler.is_finished(),
        }
    }

    /// Consume the core once the run is over.
    pub fn into_result(self) -> Result<TaskResults<T>> {
        if let Some((task, source)) = self.failure {
            return Err(TbwatchError::TaskFailed { task, source });
        }
        if !self.scheduler.is_finished() {
            return Err(TbwatchError::Other(anyhow!(
                "graph execution ended with tasks still running: {:?}",
                self.scheduler.running()
            )));
        }
        Ok(self.results)
    }
}
