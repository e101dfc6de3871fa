// src/engine/runtime.rs

use std::collections::HashMap;
use std::fmt;

use anyhow::anyhow;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::dag::{TaskAction, TaskResults};
use crate::engine::dispatch::spawn_task;
use crate::errors::Result;

use super::core::CoreRuntime;
use super::{CoreCommand, Dispatch, RuntimeEvent, TaskName};

/// Drives the core in response to task completions and spawns the actions
/// it asks for.
///
/// This is a pure IO shell around `CoreRuntime`, which contains all the
/// scheduling semantics.
pub struct Runtime<T> {
    core: CoreRuntime<T>,
    actions: HashMap<TaskName, TaskAction<T>>,
    event_tx: mpsc::Sender<RuntimeEvent<T>>,
    event_rx: mpsc::Receiver<RuntimeEvent<T>>,
}

impl<T> fmt::Debug for Runtime<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .finish_non_exhaustive()
    }
}

impl<T: Send + Sync + 'static> Runtime<T> {
    pub fn new(core: CoreRuntime<T>, actions: HashMap<TaskName, TaskAction<T>>) -> Self {
        let (event_tx, event_rx) = mpsc::channel(64);
        Self {
            core,
            actions,
            event_tx,
            event_rx,
        }
    }

    /// Main event loop.
    ///
    /// - Dispatches the initially ready tasks.
    /// - Feeds every completion into the core.
    /// - Spawns whatever the core schedules next.
    /// - Stops once the core reports that every task is terminal.
    pub async fn run(mut self) -> Result<TaskResults<T>> {
        debug!(tasks = self.actions.len(), "graph runtime started");

        let mut step = self.core.start();
        loop {
            for command in step.commands {
                self.execute_command(command)?;
            }

            if !step.keep_running {
                break;
            }

            // The runtime keeps its own sender, so `recv` only yields `None`
            // if that invariant is broken.
            let event = self
                .event_rx
                .recv()
                .await
                .ok_or_else(|| anyhow!("runtime event channel closed unexpectedly"))?;

            step = self.core.step(event);
        }

        info!("graph runtime finished");
        self.core.into_result()
    }

    /// Execute a single command from the core.
    fn execute_command(&mut self, command: CoreCommand<T>) -> Result<()> {
        match command {
            CoreCommand::DispatchTasks(dispatches) => self.spawn_ready(dispatches),
        }
    }

    fn spawn_ready(&mut self, dispatches: Vec<Dispatch<T>>) -> Result<()> {
        let names: Vec<_> = dispatches.iter().map(|d| d.task.name.as_str()).collect();
        debug!(?names, "spawning ready tasks");

        for Dispatch { task, inputs } in dispatches {
            let action = self
                .actions
                .remove(&task.name)
                .ok_or_else(|| anyhow!("no action registered for task '{}'", task.name))?;
            spawn_task(task, action, inputs, self.event_tx.clone());
        }
        Ok(())
    }
}
