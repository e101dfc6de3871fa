// src/watch/debounce.rs

//! Collapses bursts of change signals into single re-runs.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{sleep, Sleep};
use tracing::{debug, error, info, trace};

use crate::watch::patterns::WatchFilter;

/// Input of the debounce loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchSignal {
    /// The OS watch is in place; schedules the initial run.
    Established,
    /// Something changed at this path.
    Changed(PathBuf),
}

pub type TriggerFuture = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send>>;

/// Callback invoked once per quiet period.
pub type OnTrigger = Arc<dyn Fn() -> TriggerFuture + Send + Sync>;

/// Wrap an async closure as an [`OnTrigger`].
pub fn on_trigger<F, Fut>(f: F) -> OnTrigger
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    Arc::new(move || -> TriggerFuture { Box::pin(f()) })
}

/// Run until `rx` closes. Returns how many times `on_trigger` was invoked.
///
/// The timer is owned here: every relevant signal replaces it with a fresh
/// one of length `quiet`, so at most one is pending. The trigger is awaited
/// inline; signals arriving meanwhile queue up and start a new quiet period
/// once it returns. A failing trigger is logged and the loop keeps going.
pub async fn debounce_loop(
    mut rx: mpsc::UnboundedReceiver<WatchSignal>,
    filter: WatchFilter,
    quiet: Duration,
    on_trigger: OnTrigger,
) -> usize {
    let mut timer: Option<Pin<Box<Sleep>>> = None;
    let mut triggers = 0usize;

    loop {
        tokio::select! {
            signal = rx.recv() => match signal {
                Some(WatchSignal::Established) => {
                    debug!("watch established; scheduling initial run");
                    timer = Some(Box::pin(sleep(quiet)));
                }
                Some(WatchSignal::Changed(path)) => {
                    if filter.is_relevant(&path) {
                        debug!(path = %path.display(), "relevant change; restarting quiet period");
                        timer = Some(Box::pin(sleep(quiet)));
                    } else {
                        trace!(path = %path.display(), "ignoring change");
                    }
                }
                None => break,
            },
            () = wait_for(&mut timer) => {
                timer = None;
                triggers += 1;
                info!(trigger = triggers, "quiet period elapsed; running pipeline");
                if let Err(err) = on_trigger().await {
                    error!(error = %format!("{err:#}"), "triggered run failed");
                }
            }
        }
    }

    debug!(triggers, "debounce loop finished");
    triggers
}

async fn wait_for(timer: &mut Option<Pin<Box<Sleep>>>) {
    match timer {
        Some(sleep) => sleep.as_mut().await,
        None => std::future::pending().await,
    }
}
