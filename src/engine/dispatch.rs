// src/engine/dispatch.rs

//! Running a single task action.

use std::time::Instant;

use anyhow::anyhow;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::dag::{ScheduledTask, TaskAction, TaskResults};
use crate::engine::RuntimeEvent;

/// Spawn a task action on Tokio and report its completion to the runtime.
///
/// The action is both called and awaited inside its own Tokio task, so a
/// panic while building the future or while polling it is caught as a
/// `JoinError` and reported as a failure instead of stalling the run.
pub fn spawn_task<T: Send + Sync + 'static>(
    task: ScheduledTask,
    action: TaskAction<T>,
    inputs: TaskResults<T>,
    runtime_tx: mpsc::Sender<RuntimeEvent<T>>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(task = %task.name, deps = ?task.deps, "starting task");
        let started = Instant::now();

        let result = match tokio::spawn(async move { action(inputs).await }).await {
            Ok(result) => result,
            Err(join_err) => Err(anyhow!("task action did not complete: {join_err}")),
        };

        let elapsed_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok(_) => info!(task = %task.name, elapsed_ms, "task succeeded"),
            Err(err) => error!(
                task = %task.name,
                elapsed_ms,
                error = %format!("{err:#}"),
                "task failed"
            ),
        }

        if runtime_tx
            .send(RuntimeEvent::TaskCompleted {
                task: task.name.clone(),
                result,
            })
            .await
            .is_err()
        {
            warn!(task = %task.name, "runtime is gone; dropping task completion");
        }
    })
}
