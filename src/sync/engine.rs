// src/sync/engine.rs

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use tracing::{debug, info};

use crate::fs::{walk, FileSystem, FsEntry};
use crate::sync::gate::{GateDecision, SyncGate};

/// What the sync engine decided for a single source entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncKind {
    CreateDirectory,
    CopyFile,
    /// Destination already up to date (or directory already present).
    Skip,
}

/// One decision taken by [`sync_dir`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncDecision {
    pub source: PathBuf,
    pub dest: PathBuf,
    pub kind: SyncKind,
    /// Gate verdict; `None` for skips, where the gate is never consulted.
    pub gate: Option<GateDecision>,
}

impl SyncDecision {
    /// Whether the operation was actually performed.
    pub fn applied(&self) -> bool {
        self.kind != SyncKind::Skip && self.gate.is_some_and(GateDecision::is_approved)
    }
}

/// Every decision taken during one sync, in walk order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub decisions: Vec<SyncDecision>,
}

impl SyncReport {
    pub fn count(&self, kind: SyncKind) -> usize {
        self.decisions.iter().filter(|d| d.kind == kind).count()
    }

    /// Number of directories created plus files copied.
    pub fn applied(&self) -> usize {
        self.decisions.iter().filter(|d| d.applied()).count()
    }

    /// Number of operations the gate refused.
    pub fn denied(&self) -> usize {
        self.decisions
            .iter()
            .filter(|d| d.gate == Some(GateDecision::Deny))
            .count()
    }
}

/// Mirror `source_dir` into `dest_dir`.
///
/// - Missing destination directories are created (with parents) if the gate
///   approves.
/// - A file is copied unless the destination exists with an mtime greater
///   than or equal to the source's. Equal mtimes count as up to date.
///
/// Directory creation before file copy relies on the walker's pre-order
/// traversal; `dest_dir` itself must exist or be creatable by the first
/// approved directory.
pub fn sync_dir(
    fs: &dyn FileSystem,
    source_dir: &Path,
    dest_dir: &Path,
    gate: &dyn SyncGate,
) -> Result<SyncReport> {
    let mut report = SyncReport::default();

    walk(fs, source_dir, &mut |entry: &FsEntry| -> Result<()> {
        let rel = entry.path.strip_prefix(source_dir).map_err(|_| {
            anyhow!(
                "walked entry {:?} is not under source dir {:?}",
                entry.path,
                source_dir
            )
        })?;
        let dest = dest_dir.join(rel);

        let decision = if entry.is_dir {
            sync_directory(fs, entry, dest, gate)?
        } else {
            sync_file(fs, entry, dest, gate)?
        };
        report.decisions.push(decision);
        Ok(())
    })
    .with_context(|| format!("syncing {:?} -> {:?}", source_dir, dest_dir))?;

    info!(
        source = ?source_dir,
        dest = ?dest_dir,
        applied = report.applied(),
        skipped = report.count(SyncKind::Skip),
        denied = report.denied(),
        "sync finished"
    );

    Ok(report)
}

fn sync_directory(
    fs: &dyn FileSystem,
    entry: &FsEntry,
    dest: PathBuf,
    gate: &dyn SyncGate,
) -> Result<SyncDecision> {
    if fs.exists(&dest) {
        return Ok(SyncDecision {
            source: entry.path.clone(),
            dest,
            kind: SyncKind::Skip,
            gate: None,
        });
    }

    let verdict = gate.on_create_directory(&entry.path, &dest)?;
    if verdict.is_approved() {
        fs.create_dir_all(&dest)?;
    } else {
        debug!(source = ?entry.path, ?dest, "gate denied directory creation");
    }

    Ok(SyncDecision {
        source: entry.path.clone(),
        dest,
        kind: SyncKind::CreateDirectory,
        gate: Some(verdict),
    })
}

fn sync_file(
    fs: &dyn FileSystem,
    entry: &FsEntry,
    dest: PathBuf,
    gate: &dyn SyncGate,
) -> Result<SyncDecision> {
    if let Some(dest_meta) = fs.try_metadata(&dest)? {
        if dest_meta.modified >= entry.modified {
            debug!(source = ?entry.path, ?dest, "destination up to date; skipping");
            return Ok(SyncDecision {
                source: entry.path.clone(),
                dest,
                kind: SyncKind::Skip,
                gate: None,
            });
        }
    }

    let verdict = gate.on_copy_file(&entry.path, &dest)?;
    if verdict.is_approved() {
        let bytes = fs.copy_file(&entry.path, &dest)?;
        debug!(source = ?entry.path, ?dest, bytes, "copied file");
    } else {
        debug!(source = ?entry.path, ?dest, "gate denied file copy");
    }

    Ok(SyncDecision {
        source: entry.path.clone(),
        dest,
        kind: SyncKind::CopyFile,
        gate: Some(verdict),
    })
}
