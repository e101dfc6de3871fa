// src/cli.rs

//! CLI argument parsing using `clap`.
//!
//! Every flag that mirrors a config key overrides the value from the config
//! file. Relative paths given on the command line are resolved against the
//! current working directory.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `tbwatch`.
#[derive(Debug, Clone, Default, Parser)]
#[command(
    name = "tbwatch",
    version,
    about = "Compile, run and report HDL testbenches, optionally on every change.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Tbwatch.toml` in the current working directory, if present.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory searched for source files.
    #[arg(long, value_name = "DIR")]
    pub input_dir: Option<PathBuf>,

    /// Directory receiving compiled artifacts.
    #[arg(long, value_name = "DIR")]
    pub build_dir: Option<PathBuf>,

    /// Directory receiving HTML reports.
    #[arg(long, value_name = "DIR")]
    pub report_dir: Option<PathBuf>,

    /// Static files mirrored into the report directory.
    #[arg(long, value_name = "DIR")]
    pub assets_dir: Option<PathBuf>,

    /// Glob selecting every source file (relative to the input directory).
    #[arg(long, value_name = "GLOB")]
    pub file_pattern: Option<String>,

    /// Glob selecting testbenches among the source files.
    #[arg(long, value_name = "GLOB")]
    pub test_bench_pattern: Option<String>,

    /// Flag passed to the compiler; repeat for several. Replaces the
    /// configured list.
    #[arg(long = "tool-flag", value_name = "FLAG", allow_hyphen_values = true)]
    pub tool_flags: Vec<String>,

    /// Compiler program (default `iverilog`).
    #[arg(long, value_name = "PROGRAM")]
    pub compiler: Option<String>,

    /// Program used to execute compiled testbenches (e.g. `vvp`).
    #[arg(long, value_name = "PROGRAM")]
    pub runner: Option<String>,

    /// Keep watching the input directory and re-run on changes.
    #[arg(long)]
    pub watch: bool,

    /// Quiet period before a burst of changes triggers a re-run.
    #[arg(long, value_name = "MS")]
    pub quiet_period_ms: Option<u64>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `TBWATCH_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Resolve config and discover test units, but don't compile anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
