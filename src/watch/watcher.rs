// src/watch/watcher.rs

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use notify::event::EventKind;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::watch::debounce::{debounce_loop, OnTrigger, WatchSignal};
use crate::watch::patterns::WatchFilter;

/// A running watch.
///
/// Holds the OS watcher and the debounce loop. Dropping the session stops
/// watching and aborts the loop; [`WatchSession::stop`] lets an in-flight
/// run finish first.
pub struct WatchSession {
    root: PathBuf,
    watcher: Option<RecommendedWatcher>,
    task: Option<JoinHandle<usize>>,
}

impl std::fmt::Debug for WatchSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchSession")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl WatchSession {
    /// Drop the OS watcher and wait for the debounce loop to drain.
    ///
    /// Returns the number of triggered runs.
    pub async fn stop(mut self) -> Result<usize> {
        drop(self.watcher.take());
        match self.task.take() {
            Some(task) => task.await.context("watch loop did not shut down cleanly"),
            None => Ok(0),
        }
    }
}

impl Drop for WatchSession {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Watch `root` recursively and call `on_trigger` after every quiet period
/// following a relevant change, plus once right after the watch is set up.
///
/// - `include` globs are matched against paths relative to `root`.
/// - `exclude_subtrees` are skipped entirely (typically the build output).
///
/// Must be called from within a Tokio runtime.
pub fn watch(
    root: impl Into<PathBuf>,
    include: &[String],
    exclude_subtrees: &[PathBuf],
    quiet: Duration,
    on_trigger: OnTrigger,
) -> Result<WatchSession> {
    let root = root.into();
    // Canonicalize once so we have a stable base path.
    let root = root.canonicalize().unwrap_or(root);

    let exclude: Vec<PathBuf> = exclude_subtrees
        .iter()
        .map(|dir| dir.canonicalize().unwrap_or_else(|_| dir.clone()))
        .collect();
    let filter = WatchFilter::new(root.clone(), include, &exclude)?;

    // Channel from the blocking notify callback into the async world.
    let (signal_tx, signal_rx) = mpsc::unbounded_channel::<WatchSignal>();

    // Closure called synchronously by notify whenever an event arrives.
    let mut watcher = RecommendedWatcher::new(
        {
            let signal_tx = signal_tx.clone();
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    // Reads (the compiler opening sources) must not re-trigger.
                    if matches!(event.kind, EventKind::Access(_)) {
                        return;
                    }
                    for path in event.paths {
                        if signal_tx.send(WatchSignal::Changed(path)).is_err() {
                            debug!("watch loop gone; dropping notify event");
                            return;
                        }
                    }
                }
                Err(err) => warn!(error = %err, "file watch error"),
            }
        },
        Config::default(),
    )
    .context("creating file watcher")?;

    watcher
        .watch(&root, RecursiveMode::Recursive)
        .with_context(|| format!("watching {}", root.display()))?;
    info!(root = %root.display(), "file watcher started");

    // Only the notify callback keeps a sender from here on, so dropping the
    // watcher closes the channel and ends the loop.
    signal_tx
        .send(WatchSignal::Established)
        .context("queueing initial run")?;
    drop(signal_tx);

    let task = tokio::spawn(debounce_loop(signal_rx, filter, quiet, on_trigger));

    Ok(WatchSession {
        root,
        watcher: Some(watcher),
        task: Some(task),
    })
}
