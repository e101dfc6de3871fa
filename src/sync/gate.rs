// src/sync/gate.rs

//! Approve/deny policy hooks consulted before every mutating sync operation.

use std::path::Path;

use anyhow::Result;
use tracing::info;

/// Verdict returned by a [`SyncGate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Approve,
    Deny,
}

impl GateDecision {
    pub fn is_approved(self) -> bool {
        matches!(self, GateDecision::Approve)
    }
}

/// Policy hook for the sync engine.
///
/// Implementations may log or record decisions but must return promptly.
/// Returning [`GateDecision::Deny`] skips the operation without error; an
/// `Err` aborts the whole sync.
pub trait SyncGate: Send + Sync {
    fn on_create_directory(&self, _source: &Path, _dest: &Path) -> Result<GateDecision> {
        Ok(GateDecision::Approve)
    }

    fn on_copy_file(&self, _source: &Path, _dest: &Path) -> Result<GateDecision> {
        Ok(GateDecision::Approve)
    }
}

/// Gate that approves everything silently.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproveAll;

impl SyncGate for ApproveAll {}

/// Gate that approves everything and logs each operation at `info`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingGate;

impl SyncGate for LoggingGate {
    fn on_create_directory(&self, source: &Path, dest: &Path) -> Result<GateDecision> {
        info!(?source, ?dest, "sync: creating directory");
        Ok(GateDecision::Approve)
    }

    fn on_copy_file(&self, source: &Path, dest: &Path) -> Result<GateDecision> {
        info!(?source, ?dest, "sync: copying file");
        Ok(GateDecision::Approve)
    }
}
