// src/pipeline/discover.rs

//! Source discovery and test-unit partitioning.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use globset::{Glob, GlobMatcher};
use tracing::debug;

use crate::config::model::ConfigFile;
use crate::fs::{walk_pruned, FileSystem, FsEntry};
use crate::types::TestUnit;
use crate::watch::path_utils::relative_str;

/// Files under `input_dir` matching `file_pattern`, relative and `/`
/// separated, in walk order. `excluded` subtrees are not walked at all.
pub fn discover_files(
    fs: &dyn FileSystem,
    input_dir: &Path,
    file_pattern: &str,
    excluded: &[PathBuf],
) -> Result<Vec<String>> {
    let matcher = compile_matcher(file_pattern)?;
    let mut files = Vec::new();

    let prune = |path: &Path| excluded.iter().any(|dir| path.starts_with(dir));
    walk_pruned(fs, input_dir, &prune, &mut |entry: &FsEntry| -> Result<()> {
        if entry.is_dir {
            return Ok(());
        }
        let Some(rel) = relative_str(input_dir, &entry.path) else {
            return Ok(());
        };
        if matcher.is_match(&rel) {
            files.push(rel);
        }
        Ok(())
    })
    .with_context(|| format!("discovering sources under {}", input_dir.display()))?;

    debug!(count = files.len(), "discovered source files");
    Ok(files)
}

/// Split discovered files into test units.
///
/// Every file matching `test_bench_pattern` becomes a unit; every other file
/// is a dependency of every unit, in discovery order.
pub fn partition_units(
    files: &[String],
    test_bench_pattern: &str,
    cfg: &ConfigFile,
) -> Result<Vec<TestUnit>> {
    let matcher = compile_matcher(test_bench_pattern)?;
    let (benches, deps): (Vec<&String>, Vec<&String>) =
        files.iter().partition(|f| matcher.is_match(f.as_str()));
    let dependencies: Vec<String> = deps.into_iter().cloned().collect();

    Ok(benches
        .into_iter()
        .map(|file| TestUnit {
            file: file.clone(),
            dependencies: dependencies.clone(),
            artifact: cfg.artifact_for(file),
        })
        .collect())
}

/// Output directories that live under the input directory and must not be
/// treated as sources.
pub fn output_subtrees(cfg: &ConfigFile) -> Vec<PathBuf> {
    [&cfg.build_directory, &cfg.report_directory]
        .into_iter()
        .filter(|dir| dir.starts_with(&cfg.input_directory))
        .cloned()
        .collect()
}

fn compile_matcher(pattern: &str) -> Result<GlobMatcher> {
    Ok(Glob::new(pattern)
        .with_context(|| format!("invalid glob pattern: {pattern}"))?
        .compile_matcher())
}

/// Discover and partition in one go (used by dry runs).
pub fn discover_units(fs: &dyn FileSystem, cfg: &ConfigFile) -> Result<Vec<TestUnit>> {
    let files = discover_files(
        fs,
        &cfg.input_directory,
        &cfg.file_pattern,
        &output_subtrees(cfg),
    )?;
    partition_units(&files, &cfg.test_bench_pattern, cfg)
}
