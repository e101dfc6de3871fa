// src/fs/walk.rs

//! Sequential pre-order directory walker.
//!
//! For every directory the walker first hands all immediate children to the
//! callback, in listing order, and only then recurses into the child
//! directories in that same order. As a consequence a directory is always
//! visited before anything inside it, which the sync engine depends on to
//! create destination directories before copying files into them.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::Result;
use tracing::trace;

use super::FileSystem;

/// A single entry produced by [`walk`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsEntry {
    pub path: PathBuf,
    pub is_dir: bool,
    pub modified: SystemTime,
}

/// Walk `root` recursively, calling `on_entry` once per entry below it.
///
/// The root itself is not reported. Errors from listing, stat-ing or from the
/// callback abort the traversal; entries visited before the error have
/// already been processed.
pub fn walk<F>(fs: &dyn FileSystem, root: &Path, on_entry: &mut F) -> Result<()>
where
    F: FnMut(&FsEntry) -> Result<()>,
{
    walk_pruned(fs, root, &|_: &Path| false, on_entry)
}

/// Like [`walk`], but any child for which `prune` returns true is neither
/// stat-ed, reported nor descended into.
pub fn walk_pruned<P, F>(fs: &dyn FileSystem, root: &Path, prune: &P, on_entry: &mut F) -> Result<()>
where
    P: Fn(&Path) -> bool,
    F: FnMut(&FsEntry) -> Result<()>,
{
    let children = fs.read_dir(root)?;
    let mut subdirs = Vec::new();

    for path in children {
        if prune(&path) {
            trace!(?path, "walk: pruned");
            continue;
        }
        let meta = fs.metadata(&path)?;
        let entry = FsEntry {
            path,
            is_dir: meta.is_dir,
            modified: meta.modified,
        };
        trace!(path = ?entry.path, is_dir = entry.is_dir, "walk: visiting entry");
        on_entry(&entry)?;
        if entry.is_dir {
            subdirs.push(entry.path);
        }
    }

    for dir in subdirs {
        walk_pruned(fs, &dir, prune, on_entry)?;
    }

    Ok(())
}
