// src/dag/mod.rs

//! Task graph definition and scheduling.
//!
//! - [`task`] defines [`Task`], [`TaskGraph`] and [`TaskResults`].
//! - [`graph`] holds the adjacency view of a graph.
//! - [`validate`] rejects unknown dependencies and cycles.
//! - [`scheduler`] is the per-execution state machine deciding which tasks
//!   are ready and when the run is over.
//! - [`task_info`] provides task state and scheduled task types.
//! - [`scheduler_step`] defines the result type for scheduler steps.
//! - [`state_manager`] implements the state transitions.

pub mod graph;
pub mod scheduler;
pub mod scheduler_step;
pub mod state_manager;
pub mod task;
pub mod task_info;
pub mod validate;

pub use graph::DagGraph;
pub use scheduler::Scheduler;
pub use scheduler_step::SchedulerStep;
pub use task::{Task, TaskAction, TaskFuture, TaskGraph, TaskResults};
pub use task_info::{ScheduledTask, TaskState};
