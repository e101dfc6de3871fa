// src/pipeline/stages.rs

//! Per-stage outputs threaded through the executor's result mapping.

use std::path::PathBuf;

use anyhow::{bail, Result};

use crate::exec::ToolOutput;
use crate::sync::SyncReport;
use crate::types::{TestUnit, UnitResult};

/// A unit after its compile step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledUnit {
    pub unit: TestUnit,
    pub compile: ToolOutput,
}

/// A unit after its run step; `run` is `None` when compilation failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RanUnit {
    pub unit: TestUnit,
    pub compile: ToolOutput,
    pub run: Option<ToolOutput>,
}

/// Output of one pipeline task. Each task produces exactly one variant.
#[derive(Debug, Clone)]
pub enum StageOutput {
    /// A directory that now exists.
    Directory(PathBuf),
    /// Discovered source files, relative to the input directory.
    Files(Vec<String>),
    Units(Vec<TestUnit>),
    Compiled(Vec<CompiledUnit>),
    Ran(Vec<RanUnit>),
    Analyzed(Vec<UnitResult>),
    Assets(SyncReport),
    /// Report pages written, index last.
    Reports(Vec<PathBuf>),
}

impl StageOutput {
    fn kind(&self) -> &'static str {
        match self {
            StageOutput::Directory(_) => "directory",
            StageOutput::Files(_) => "files",
            StageOutput::Units(_) => "units",
            StageOutput::Compiled(_) => "compiled",
            StageOutput::Ran(_) => "ran",
            StageOutput::Analyzed(_) => "analyzed",
            StageOutput::Assets(_) => "assets",
            StageOutput::Reports(_) => "reports",
        }
    }

    pub fn files(&self) -> Result<&[String]> {
        match self {
            StageOutput::Files(files) => Ok(files),
            other => bail!("expected files output, got {}", other.kind()),
        }
    }

    pub fn units(&self) -> Result<&[TestUnit]> {
        match self {
            StageOutput::Units(units) => Ok(units),
            other => bail!("expected units output, got {}", other.kind()),
        }
    }

    pub fn compiled(&self) -> Result<&[CompiledUnit]> {
        match self {
            StageOutput::Compiled(units) => Ok(units),
            other => bail!("expected compiled output, got {}", other.kind()),
        }
    }

    pub fn ran(&self) -> Result<&[RanUnit]> {
        match self {
            StageOutput::Ran(units) => Ok(units),
            other => bail!("expected ran output, got {}", other.kind()),
        }
    }

    pub fn analyzed(&self) -> Result<&[UnitResult]> {
        match self {
            StageOutput::Analyzed(results) => Ok(results),
            other => bail!("expected analyzed output, got {}", other.kind()),
        }
    }

    pub fn assets(&self) -> Result<&SyncReport> {
        match self {
            StageOutput::Assets(report) => Ok(report),
            other => bail!("expected assets output, got {}", other.kind()),
        }
    }

    pub fn reports(&self) -> Result<&[PathBuf]> {
        match self {
            StageOutput::Reports(paths) => Ok(paths),
            other => bail!("expected reports output, got {}", other.kind()),
        }
    }
}
