// src/config/model.rs

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

pub const DEFAULT_FILE_PATTERN: &str = "**/*.v";
pub const DEFAULT_TEST_BENCH_PATTERN: &str = "**/*_tb.v";
pub const DEFAULT_COMPILER: &str = "iverilog";
pub const DEFAULT_QUIET_PERIOD_MS: u64 = 100;

pub fn default_tool_flags() -> Vec<String> {
    vec!["-Wall".to_string()]
}

/// Configuration as read from a TOML file, before defaults and validation.
///
/// ```toml
/// input_directory = "rtl"
/// build_directory = "build/out"
/// report_directory = "build/report"
/// assets_directory = "report-skeleton"
/// file_pattern = "**/*.v"
/// test_bench_pattern = "**/*_tb.v"
/// tool_flags = ["-Wall", "-g2012"]
/// compiler = "iverilog"
/// runner = "vvp"
/// watch = true
/// quiet_period_ms = 100
/// ```
///
/// Every key is optional. Relative `input_directory` values are resolved
/// against the directory containing the config file; relative build, report
/// and assets directories against the input directory.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub input_directory: Option<PathBuf>,
    #[serde(default)]
    pub build_directory: Option<PathBuf>,
    #[serde(default)]
    pub report_directory: Option<PathBuf>,
    /// Static files mirrored into the report directory before rendering.
    #[serde(default)]
    pub assets_directory: Option<PathBuf>,
    #[serde(default)]
    pub file_pattern: Option<String>,
    #[serde(default)]
    pub test_bench_pattern: Option<String>,
    #[serde(default)]
    pub tool_flags: Option<Vec<String>>,
    #[serde(default)]
    pub compiler: Option<String>,
    #[serde(default)]
    pub runner: Option<String>,
    #[serde(default)]
    pub watch: Option<bool>,
    #[serde(default)]
    pub quiet_period_ms: Option<u64>,
}

/// Validated configuration with every default applied and every directory
/// absolute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    pub input_directory: PathBuf,
    pub build_directory: PathBuf,
    pub report_directory: PathBuf,
    pub assets_directory: Option<PathBuf>,
    pub file_pattern: String,
    pub test_bench_pattern: String,
    pub tool_flags: Vec<String>,
    pub compiler: String,
    pub runner: Option<String>,
    pub watch: bool,
    pub quiet_period: Duration,
}

impl ConfigFile {
    /// Artifact path for a testbench: `<build>/<file>.out`.
    pub fn artifact_for(&self, file: &str) -> PathBuf {
        self.build_directory.join(format!("{file}.out"))
    }

    /// Report page for a testbench: `<report>/<file>.html`.
    pub fn report_for(&self, file: &str) -> PathBuf {
        self.report_directory.join(format!("{file}.html"))
    }

    pub fn report_index(&self) -> PathBuf {
        self.report_directory.join("index.html")
    }
}
