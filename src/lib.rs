// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod pipeline;
pub mod report;
pub mod sync;
pub mod types;
pub mod watch;

use anyhow::Result;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::loader::load_for_cli;
use crate::config::model::ConfigFile;
use crate::fs::RealFileSystem;
use crate::pipeline::{discover_units, output_subtrees, Pipeline, PipelineSummary};
use crate::watch::on_trigger;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (file + CLI overrides)
/// - the pipeline and its collaborators
/// - (optional) the file watcher
/// - Ctrl-C handling in watch mode
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = load_for_cli(&args)?;

    if args.dry_run {
        return print_dry_run(&cfg);
    }

    let watch_mode = cfg.watch;
    let pipeline = Pipeline::from_config(cfg);

    if !watch_mode {
        let summary = pipeline.run().await?;
        print_summary(&summary);
        return Ok(());
    }

    run_watch(pipeline).await
}

/// Re-run the pipeline on every debounced change until Ctrl-C.
async fn run_watch(pipeline: Pipeline) -> Result<()> {
    let cfg = pipeline.config().clone();
    let include = vec![cfg.file_pattern.clone()];
    let excluded = output_subtrees(&cfg);

    let trigger = on_trigger(move || {
        let pipeline = pipeline.clone();
        async move {
            let summary = pipeline.run().await?;
            print_summary(&summary);
            Ok(())
        }
    });

    let session = watch::watch(
        &cfg.input_directory,
        &include,
        &excluded,
        cfg.quiet_period,
        trigger,
    )?;

    tokio::signal::ctrl_c().await?;
    info!("Ctrl-C received; stopping watch");

    let runs = session.stop().await?;
    debug!(runs, "watch stopped");
    Ok(())
}

fn print_summary(summary: &PipelineSummary) {
    for unit in &summary.units {
        println!("{:<40} {}", unit.name, unit.classification);
    }
    println!(
        "{} of {} units succeeded",
        summary.passed(),
        summary.units.len()
    );
}

/// Print the resolved configuration and discovered units; run nothing.
fn print_dry_run(cfg: &ConfigFile) -> Result<()> {
    println!("tbwatch dry-run");
    println!("  input_directory    = {}", cfg.input_directory.display());
    println!("  build_directory    = {}", cfg.build_directory.display());
    println!("  report_directory   = {}", cfg.report_directory.display());
    if let Some(assets) = &cfg.assets_directory {
        println!("  assets_directory   = {}", assets.display());
    }
    println!("  file_pattern       = {}", cfg.file_pattern);
    println!("  test_bench_pattern = {}", cfg.test_bench_pattern);
    println!("  tool_flags         = {:?}", cfg.tool_flags);
    println!("  compiler           = {}", cfg.compiler);
    if let Some(runner) = &cfg.runner {
        println!("  runner             = {runner}");
    }
    println!("  watch              = {}", cfg.watch);
    println!("  quiet_period_ms    = {}", cfg.quiet_period.as_millis());
    println!();

    let units = discover_units(&RealFileSystem, cfg)?;
    println!("test units ({}):", units.len());
    for unit in &units {
        println!("  - {}", unit.file);
        println!("      artifact: {}", unit.artifact.display());
        if !unit.dependencies.is_empty() {
            println!("      deps: {:?}", unit.dependencies);
        }
    }

    debug!("dry-run complete (no execution)");
    Ok(())
}
