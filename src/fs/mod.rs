// src/fs/mod.rs

//! Filesystem abstraction used by the walker, the sync engine and the
//! pipeline stages.
//!
//! - [`RealFileSystem`] talks to `std::fs`.
//! - [`mock::MockFileSystem`] is an in-memory tree with explicit mtimes, used
//!   to test traversal order and sync decisions deterministically.
//! - [`walk`] is the sequential pre-order directory walker.

use std::fmt::Debug;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{Context, Result};

pub mod mock;
pub mod walk;

pub use walk::{walk, walk_pruned, FsEntry};

/// The subset of file metadata the orchestration core cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metadata {
    pub is_dir: bool,
    pub modified: SystemTime,
}

/// Abstract filesystem interface.
pub trait FileSystem: Send + Sync + Debug {
    /// Stat a path. Fails if it does not exist.
    fn metadata(&self, path: &Path) -> Result<Metadata>;

    /// Stat a path, returning `None` when it does not exist.
    fn try_metadata(&self, path: &Path) -> Result<Option<Metadata>>;

    /// Return the entries of a directory as full paths, in listing order.
    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>>;

    /// Create a directory and any missing parents.
    fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// Stream-copy `from` to `to`, overwriting `to`. The parent of `to` must
    /// already exist. The source mtime is carried over to the destination.
    ///
    /// Returns the number of bytes copied.
    fn copy_file(&self, from: &Path, to: &Path) -> Result<u64>;

    /// Write `contents` to `path`, creating parent directories as needed.
    fn write(&self, path: &Path, contents: &[u8]) -> Result<()>;

    fn exists(&self, path: &Path) -> bool;
}

/// Implementation that uses `std::fs`.
#[derive(Debug, Clone, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn metadata(&self, path: &Path) -> Result<Metadata> {
        let meta = fs::metadata(path).with_context(|| format!("stat {:?}", path))?;
        Ok(Metadata {
            is_dir: meta.is_dir(),
            modified: meta
                .modified()
                .with_context(|| format!("reading mtime of {:?}", path))?,
        })
    }

    fn try_metadata(&self, path: &Path) -> Result<Option<Metadata>> {
        match fs::metadata(path) {
            Ok(meta) => Ok(Some(Metadata {
                is_dir: meta.is_dir(),
                modified: meta
                    .modified()
                    .with_context(|| format!("reading mtime of {:?}", path))?,
            })),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err).with_context(|| format!("stat {:?}", path)),
        }
    }

    /// Children are sorted by file name so that traversal is deterministic
    /// across platforms.
    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(path).with_context(|| format!("reading dir {:?}", path))? {
            let entry = entry.with_context(|| format!("reading entry of dir {:?}", path))?;
            entries.push(entry.path());
        }
        entries.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(entries)
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path).with_context(|| format!("creating dir {:?}", path))
    }

    fn copy_file(&self, from: &Path, to: &Path) -> Result<u64> {
        let mut src = fs::File::open(from).with_context(|| format!("opening file {:?}", from))?;
        let modified = src
            .metadata()
            .and_then(|m| m.modified())
            .with_context(|| format!("reading mtime of {:?}", from))?;

        let mut dst = fs::File::create(to).with_context(|| format!("creating file {:?}", to))?;
        let bytes = io::copy(&mut src, &mut dst)
            .with_context(|| format!("copying {:?} -> {:?}", from, to))?;
        dst.flush().with_context(|| format!("flushing {:?}", to))?;
        dst.set_modified(modified)
            .with_context(|| format!("setting mtime of {:?}", to))?;

        Ok(bytes)
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("creating dir {:?}", parent))?;
        }
        let mut file = fs::File::create(path).with_context(|| format!("creating file {:?}", path))?;
        file.write_all(contents).with_context(|| format!("writing to file {:?}", path))?;
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}
