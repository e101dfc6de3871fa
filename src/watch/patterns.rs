// src/watch/patterns.rs

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::watch::path_utils::relative_str;

/// Decides which changed paths are worth a re-run.
///
/// A path is relevant when it lies under `root`, outside every excluded
/// subtree, and its `/`-separated path relative to `root` matches one of the
/// include globs.
#[derive(Clone)]
pub struct WatchFilter {
    root: PathBuf,
    include: GlobSet,
    /// Excluded subtrees, relative to `root`.
    excluded: Vec<PathBuf>,
}

impl fmt::Debug for WatchFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchFilter")
            .field("root", &self.root)
            .field("excluded", &self.excluded)
            .finish_non_exhaustive()
    }
}

impl WatchFilter {
    /// Compile a filter. Excluded directories outside `root` can never match
    /// and are dropped.
    pub fn new(root: impl Into<PathBuf>, include: &[String], excluded: &[PathBuf]) -> Result<Self> {
        let root = root.into();
        let include = build_globset(include)?;
        let excluded = excluded
            .iter()
            .filter_map(|dir| relative_str(&root, dir))
            .map(PathBuf::from)
            .collect();

        Ok(Self {
            root,
            include,
            excluded,
        })
    }

    pub fn is_relevant(&self, path: &Path) -> bool {
        let Some(rel) = relative_str(&self.root, path) else {
            return false;
        };
        if rel.is_empty() {
            return false;
        }
        let rel_path = Path::new(&rel);
        if self
            .excluded
            .iter()
            .any(|dir| !dir.as_os_str().is_empty() && rel_path.starts_with(dir))
        {
            return false;
        }
        self.include.is_match(&rel)
    }
}

/// Build a GlobSet from simple string patterns.
fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = Glob::new(pat).with_context(|| format!("invalid glob pattern: {pat}"))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter() -> WatchFilter {
        WatchFilter::new(
            "/proj",
            &["**/*.v".to_string()],
            &[PathBuf::from("/proj/build/out"), PathBuf::from("/elsewhere")],
        )
        .unwrap()
    }

    #[test]
    fn matching_source_is_relevant() {
        let f = filter();
        assert!(f.is_relevant(Path::new("/proj/a.v")));
        assert!(f.is_relevant(Path::new("/proj/sub/b_tb.v")));
    }

    #[test]
    fn non_matching_or_outside_paths_are_ignored() {
        let f = filter();
        assert!(!f.is_relevant(Path::new("/proj/notes.txt")));
        assert!(!f.is_relevant(Path::new("/other/a.v")));
    }

    #[test]
    fn excluded_subtree_is_ignored() {
        let f = filter();
        assert!(!f.is_relevant(Path::new("/proj/build/out/a_tb.v")));
        // Only the subtree is excluded, not its siblings.
        assert!(f.is_relevant(Path::new("/proj/build/gen.v")));
    }
}
