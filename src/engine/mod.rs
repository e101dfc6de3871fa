// src/engine/mod.rs

//! Task graph executor.
//!
//! This module ties together:
//! - the DAG scheduler (which tasks are ready, when the run is over)
//! - the result mapping handed from tasks to their dependents
//! - the async event loop that dispatches task actions onto Tokio and
//!   collects their completions
//!
//! The pure core state machine lives in [`core`]; the async/IO shell is
//! implemented in [`runtime`], and [`dispatch`] runs a single action.

use crate::dag::{Scheduler, TaskGraph, TaskResults};
use crate::errors::Result;

/// Canonical task name type used throughout the engine.
pub type TaskName = String;

/// Outcome of a task action for the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    Success,
    Failed,
}

/// Events flowing into the runtime from dispatched tasks.
#[derive(Debug)]
pub enum RuntimeEvent<T> {
    /// A task action finished, with its output or its error.
    TaskCompleted {
        task: TaskName,
        result: anyhow::Result<T>,
    },
}

pub mod core;
pub mod dispatch;
pub mod runtime;

pub use self::core::{CoreCommand, CoreRuntime, CoreStep, Dispatch};
pub use runtime::Runtime;

/// Validate and execute a task graph.
///
/// Returns one result per task when every task succeeds. On the first task
/// failure no further tasks are started, already-running tasks are awaited
/// and their results discarded, and the failure is returned as
/// [`crate::errors::TbwatchError::TaskFailed`].
pub async fn execute<T: Send + Sync + 'static>(graph: TaskGraph<T>) -> Result<TaskResults<T>> {
    graph.validate()?;
    let (dag, actions) = graph.into_parts();
    let core = CoreRuntime::new(Scheduler::new(dag));
    Runtime::new(core, actions).run().await
}
