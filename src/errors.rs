// src/errors.rs

//! Crate-wide error type and result alias.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TbwatchError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Duplicate task in graph: {0}")]
    DuplicateTask(String),

    #[error("Task '{task}' depends on unknown task '{dependency}'")]
    UnknownDependency { task: String, dependency: String },

    #[error("Cycle detected in DAG: {0}")]
    DagCycle(String),

    #[error("Task '{task}' failed: {source:#}")]
    TaskFailed {
        task: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Invalid glob pattern: {0}")]
    GlobError(#[from] globset::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TbwatchError {
    /// Whether this error was raised before any task action ran.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            TbwatchError::ConfigError(_)
                | TbwatchError::DuplicateTask(_)
                | TbwatchError::UnknownDependency { .. }
                | TbwatchError::DagCycle(_)
                | TbwatchError::GlobError(_)
                | TbwatchError::TomlError(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, TbwatchError>;
