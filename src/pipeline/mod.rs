// src/pipeline/mod.rs

//! The testbench pipeline expressed as a task graph.
//!
//! ```text
//! build_directory ─────────────┐
//! files ── test_units ─────────┴─ compile ── run ── analyze ──┐
//! report_directory ── report_assets ──────────────────────────┴─ reports
//! ```
//!
//! Every stage produces one [`StageOutput`] variant; downstream stages read
//! their inputs from the executor's dependency mapping.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, anyhow};
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::config::model::ConfigFile;
use crate::dag::{Task, TaskGraph, TaskResults};
use crate::engine::execute;
use crate::errors::Result;
use crate::exec::{CompileRequest, RealToolchain, ToolOutput, Toolchain};
use crate::fs::{FileSystem, RealFileSystem};
use crate::report::{HtmlReportRenderer, ReportRenderer};
use crate::sync::{sync_dir, LoggingGate, SyncReport};
use crate::types::{Classification, TestUnit, UnitResult};

pub mod discover;
pub mod stages;

pub use discover::{discover_files, discover_units, output_subtrees, partition_units};
pub use stages::{CompiledUnit, RanUnit, StageOutput};

pub const BUILD_DIRECTORY: &str = "build_directory";
pub const REPORT_DIRECTORY: &str = "report_directory";
pub const FILES: &str = "files";
pub const TEST_UNITS: &str = "test_units";
pub const COMPILE: &str = "compile";
pub const RUN: &str = "run";
pub const ANALYZE: &str = "analyze";
pub const REPORT_ASSETS: &str = "report_assets";
pub const REPORTS: &str = "reports";

/// What one pipeline run produced.
#[derive(Debug, Clone)]
pub struct PipelineSummary {
    pub units: Vec<UnitResult>,
    pub reports: Vec<PathBuf>,
    pub assets: SyncReport,
}

impl PipelineSummary {
    pub fn passed(&self) -> usize {
        self.units
            .iter()
            .filter(|u| u.classification.is_success())
            .count()
    }

    pub fn failed(&self) -> usize {
        self.units.len() - self.passed()
    }
}

/// Collaborators and configuration for building pipeline graphs.
///
/// Cheap to clone; every run builds a fresh graph.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: Arc<ConfigFile>,
    fs: Arc<dyn FileSystem>,
    toolchain: Arc<dyn Toolchain>,
    renderer: Arc<dyn ReportRenderer>,
}

impl Pipeline {
    pub fn new(
        config: Arc<ConfigFile>,
        fs: Arc<dyn FileSystem>,
        toolchain: Arc<dyn Toolchain>,
        renderer: Arc<dyn ReportRenderer>,
    ) -> Self {
        Self {
            config,
            fs,
            toolchain,
            renderer,
        }
    }

    /// Production wiring: real filesystem, processes and HTML reports.
    pub fn from_config(config: ConfigFile) -> Self {
        let toolchain = RealToolchain::from_config(&config);
        Self::new(
            Arc::new(config),
            Arc::new(RealFileSystem),
            Arc::new(toolchain),
            Arc::new(HtmlReportRenderer),
        )
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Build, execute and summarise one run.
    ///
    /// Per-unit compile or run failures are part of the summary; only
    /// infrastructure failures (filesystem, bad patterns) are errors.
    pub async fn run(&self) -> Result<PipelineSummary> {
        let results = execute(self.build_graph()).await?;

        let summary = PipelineSummary {
            units: results.get(ANALYZE)?.analyzed()?.to_vec(),
            reports: results.get(REPORTS)?.reports()?.to_vec(),
            assets: results.get(REPORT_ASSETS)?.assets()?.clone(),
        };

        info!(
            units = summary.units.len(),
            passed = summary.passed(),
            failed = summary.failed(),
            "pipeline finished"
        );
        Ok(summary)
    }

    /// The full task graph for one run.
    pub fn build_graph(&self) -> TaskGraph<StageOutput> {
        TaskGraph::new()
            .with(self.create_directory_task(BUILD_DIRECTORY, self.config.build_directory.clone()))
            .with(self.create_directory_task(REPORT_DIRECTORY, self.config.report_directory.clone()))
            .with(self.files_task())
            .with(self.test_units_task())
            .with(self.compile_task())
            .with(self.run_task())
            .with(analyze_task())
            .with(self.report_assets_task())
            .with(self.reports_task())
    }

    fn create_directory_task(&self, name: &str, dir: PathBuf) -> Task<StageOutput> {
        let fs = Arc::clone(&self.fs);
        Task::new(name, &[], move |_| async move {
            let created = dir.clone();
            blocking(move || {
                fs.create_dir_all(&created)
                    .with_context(|| format!("creating {}", created.display()))
            })
            .await?;
            Ok(StageOutput::Directory(dir))
        })
    }

    fn files_task(&self) -> Task<StageOutput> {
        let fs = Arc::clone(&self.fs);
        let cfg = Arc::clone(&self.config);
        Task::new(FILES, &[], move |_| async move {
            let files = blocking(move || {
                discover_files(
                    fs.as_ref(),
                    &cfg.input_directory,
                    &cfg.file_pattern,
                    &output_subtrees(&cfg),
                )
            })
            .await?;
            info!(count = files.len(), "source files discovered");
            Ok(StageOutput::Files(files))
        })
    }

    fn test_units_task(&self) -> Task<StageOutput> {
        let cfg = Arc::clone(&self.config);
        Task::new(TEST_UNITS, &[FILES], move |deps: TaskResults<StageOutput>| async move {
            let files = deps.get(FILES)?.files()?;
            let units = partition_units(files, &cfg.test_bench_pattern, &cfg)?;
            info!(count = units.len(), "test units found");
            Ok(StageOutput::Units(units))
        })
    }

    fn compile_task(&self) -> Task<StageOutput> {
        let fs = Arc::clone(&self.fs);
        let cfg = Arc::clone(&self.config);
        let toolchain = Arc::clone(&self.toolchain);
        Task::new(
            COMPILE,
            &[BUILD_DIRECTORY, TEST_UNITS],
            move |deps: TaskResults<StageOutput>| async move {
                let units = deps.get(TEST_UNITS)?.units()?.to_vec();

                // Nested testbenches need their artifact directory.
                let parents: Vec<PathBuf> = units
                    .iter()
                    .filter_map(|u| u.artifact.parent().map(Path::to_path_buf))
                    .collect();
                blocking(move || {
                    for dir in parents {
                        fs.create_dir_all(&dir)
                            .with_context(|| format!("creating {}", dir.display()))?;
                    }
                    Ok(())
                })
                .await?;

                let outputs = for_each_unit(&units, |unit| {
                    let toolchain = Arc::clone(&toolchain);
                    let request = compile_request(&cfg, unit);
                    async move { toolchain.compile(&request).await }
                })
                .await?;

                let compiled = units
                    .into_iter()
                    .zip(outputs)
                    .map(|(unit, compile)| CompiledUnit { unit, compile })
                    .collect();
                Ok(StageOutput::Compiled(compiled))
            },
        )
    }

    fn run_task(&self) -> Task<StageOutput> {
        let toolchain = Arc::clone(&self.toolchain);
        Task::new(RUN, &[COMPILE], move |deps: TaskResults<StageOutput>| async move {
            let compiled = deps.get(COMPILE)?.compiled()?.to_vec();

            let to_run: Vec<TestUnit> = compiled
                .iter()
                .filter(|c| c.compile.succeeded())
                .map(|c| c.unit.clone())
                .collect();
            for c in compiled.iter().filter(|c| !c.compile.succeeded()) {
                warn!(
                    unit = %c.unit.file,
                    exit_code = c.compile.exit_code,
                    "compile failed; skipping run"
                );
            }

            let outputs = for_each_unit(&to_run, |unit| {
                let toolchain = Arc::clone(&toolchain);
                let artifact = unit.artifact.clone();
                async move { toolchain.run(&artifact).await }
            })
            .await?;

            let mut outputs = outputs.into_iter();
            let ran = compiled
                .into_iter()
                .map(|CompiledUnit { unit, compile }| {
                    let run = if compile.succeeded() {
                        outputs.next()
                    } else {
                        None
                    };
                    RanUnit { unit, compile, run }
                })
                .collect();
            Ok(StageOutput::Ran(ran))
        })
    }

    fn report_assets_task(&self) -> Task<StageOutput> {
        let fs = Arc::clone(&self.fs);
        let cfg = Arc::clone(&self.config);
        Task::new(REPORT_ASSETS, &[REPORT_DIRECTORY], move |_| async move {
            let Some(assets) = cfg.assets_directory.clone() else {
                return Ok(StageOutput::Assets(SyncReport::default()));
            };
            let dest = cfg.report_directory.clone();
            let report = blocking(move || {
                sync_dir(fs.as_ref(), &assets, &dest, &LoggingGate)
                    .with_context(|| format!("syncing report assets from {}", assets.display()))
            })
            .await?;
            info!(applied = report.applied(), "report assets synced");
            Ok(StageOutput::Assets(report))
        })
    }

    fn reports_task(&self) -> Task<StageOutput> {
        let fs = Arc::clone(&self.fs);
        let cfg = Arc::clone(&self.config);
        let renderer = Arc::clone(&self.renderer);
        Task::new(
            REPORTS,
            &[ANALYZE, REPORT_DIRECTORY, REPORT_ASSETS],
            move |deps: TaskResults<StageOutput>| async move {
                let results = deps.get(ANALYZE)?.analyzed()?.to_vec();
                blocking(move || write_reports(fs.as_ref(), &cfg, renderer.as_ref(), &results))
                    .await
                    .map(StageOutput::Reports)
            },
        )
    }
}

fn analyze_task() -> Task<StageOutput> {
    Task::new(ANALYZE, &[RUN], |deps: TaskResults<StageOutput>| async move {
        let ran = deps.get(RUN)?.ran()?;
        let results: Vec<UnitResult> = ran.iter().map(analyze_unit).collect();
        for r in &results {
            match r.classification {
                Classification::Success => info!(unit = %r.name, "{}", r.classification),
                _ => warn!(unit = %r.name, "{}", r.classification),
            }
        }
        Ok(StageOutput::Analyzed(results))
    })
}

/// Classify one unit from its exit codes.
pub fn analyze_unit(ran: &RanUnit) -> UnitResult {
    let run_exit_code = ran.run.as_ref().map(|r| r.exit_code);
    UnitResult {
        name: ran.unit.file.clone(),
        compile_output: ran.compile.output.clone(),
        compile_exit_code: ran.compile.exit_code,
        run_output: ran.run.as_ref().map(|r| r.output.clone()),
        run_exit_code,
        classification: Classification::from_exit_codes(ran.compile.exit_code, run_exit_code),
    }
}

fn compile_request(cfg: &ConfigFile, unit: &TestUnit) -> CompileRequest {
    CompileRequest {
        output: unit.artifact.clone(),
        dependencies: unit
            .dependencies
            .iter()
            .map(|d| cfg.input_directory.join(d))
            .collect(),
        primary: cfg.input_directory.join(&unit.file),
        flags: cfg.tool_flags.clone(),
    }
}

fn write_reports(
    fs: &dyn FileSystem,
    cfg: &ConfigFile,
    renderer: &dyn ReportRenderer,
    results: &[UnitResult],
) -> anyhow::Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(results.len() + 1);
    for result in results {
        let path = cfg.report_for(&result.name);
        fs.write(&path, &renderer.render_unit(result))
            .with_context(|| format!("writing report {}", path.display()))?;
        written.push(path);
    }

    let index = cfg.report_index();
    fs.write(&index, &renderer.render_summary(results))
        .with_context(|| format!("writing report {}", index.display()))?;
    written.push(index);

    info!(pages = written.len(), "reports written");
    Ok(written)
}

/// Run `op` for every unit concurrently; outputs come back in unit order.
async fn for_each_unit<F, Fut>(units: &[TestUnit], mut op: F) -> anyhow::Result<Vec<ToolOutput>>
where
    F: FnMut(&TestUnit) -> Fut,
    Fut: std::future::Future<Output = ToolOutput> + Send + 'static,
{
    let mut set = JoinSet::new();
    for (idx, unit) in units.iter().enumerate() {
        let fut = op(unit);
        set.spawn(async move { (idx, fut.await) });
    }

    let mut outputs: Vec<Option<ToolOutput>> = vec![None; units.len()];
    while let Some(joined) = set.join_next().await {
        let (idx, output) = joined.context("toolchain invocation did not complete")?;
        outputs[idx] = Some(output);
    }

    outputs
        .into_iter()
        .enumerate()
        .map(|(idx, o)| o.ok_or_else(|| anyhow!("missing toolchain output for unit #{idx}")))
        .collect()
}

async fn blocking<R, F>(f: F) -> anyhow::Result<R>
where
    F: FnOnce() -> anyhow::Result<R> + Send + 'static,
    R: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .context("blocking filesystem work did not complete")?
}
