// src/exec/backend.rs

//! Pluggable toolchain abstraction.
//!
//! The pipeline talks to a `Toolchain` instead of spawning processes itself.
//! This makes it easy to swap in a fake toolchain in tests while keeping the
//! production implementation in [`RealToolchain`].
//!
//! Neither operation can fail as far as the pipeline is concerned: a process
//! that cannot be spawned is reported as exit code `-1` with the spawn error
//! as its output.

use std::ffi::OsString;
use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use tracing::info;

use crate::config::model::ConfigFile;

use super::command::run_captured;

/// Combined output and exit code of one tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    /// stdout and stderr, interleaved line by line in arrival order.
    pub output: String,
    pub exit_code: i32,
}

impl ToolOutput {
    pub fn new(output: impl Into<String>, exit_code: i32) -> Self {
        Self {
            output: output.into(),
            exit_code,
        }
    }

    /// Output recorded when the process could not be started at all.
    pub fn spawn_failure(err: &anyhow::Error) -> Self {
        Self {
            output: format!("{err:#}"),
            exit_code: -1,
        }
    }

    pub fn succeeded(&self) -> bool {
        self.exit_code == 0
    }
}

/// Arguments of a single compile step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileRequest {
    /// Artifact to produce.
    pub output: PathBuf,
    /// Files compiled alongside the primary one, in order.
    pub dependencies: Vec<PathBuf>,
    /// The testbench itself; always passed last.
    pub primary: PathBuf,
    pub flags: Vec<String>,
}

pub type ToolFuture<'a> = Pin<Box<dyn Future<Output = ToolOutput> + Send + 'a>>;

/// Trait abstracting how testbenches are compiled and run.
///
/// Production code uses [`RealToolchain`]; tests can provide their own
/// implementation that doesn't spawn real processes.
pub trait Toolchain: Send + Sync + fmt::Debug {
    fn compile<'a>(&'a self, request: &'a CompileRequest) -> ToolFuture<'a>;

    /// Execute a compiled artifact.
    fn run<'a>(&'a self, artifact: &'a Path) -> ToolFuture<'a>;
}

/// Toolchain backed by real processes.
///
/// Compiles with `<compiler> <flags...> -o<output> <deps...> <primary>` and
/// runs the artifact directly, or as `<runner> <artifact>` when a runner is
/// configured (e.g. `vvp` for Icarus Verilog builds).
#[derive(Debug, Clone)]
pub struct RealToolchain {
    compiler: String,
    runner: Option<String>,
    working_dir: PathBuf,
}

impl RealToolchain {
    pub fn new(compiler: impl Into<String>, runner: Option<String>, working_dir: PathBuf) -> Self {
        Self {
            compiler: compiler.into(),
            runner,
            working_dir,
        }
    }

    /// Build from validated config: processes run inside the input directory.
    pub fn from_config(cfg: &ConfigFile) -> Self {
        Self::new(
            cfg.compiler.clone(),
            cfg.runner.clone(),
            cfg.input_directory.clone(),
        )
    }
}

/// Argument vector for a compile step, without the program name.
pub fn compile_args(request: &CompileRequest) -> Vec<OsString> {
    let mut args: Vec<OsString> = request.flags.iter().map(OsString::from).collect();

    let mut output = OsString::from("-o");
    output.push(request.output.as_os_str());
    args.push(output);

    args.extend(request.dependencies.iter().map(|p| p.as_os_str().to_owned()));
    args.push(request.primary.as_os_str().to_owned());
    args
}

fn display_command(program: &str, args: &[OsString]) -> String {
    let mut line = program.to_string();
    for arg in args {
        line.push(' ');
        line.push_str(&arg.to_string_lossy());
    }
    line
}

impl Toolchain for RealToolchain {
    fn compile<'a>(&'a self, request: &'a CompileRequest) -> ToolFuture<'a> {
        Box::pin(async move {
            let args = compile_args(request);
            info!(
                unit = %request.primary.display(),
                cmd = %display_command(&self.compiler, &args),
                "compiling"
            );
            run_captured(
                OsString::from(&self.compiler),
                &args,
                Some(&self.working_dir),
            )
            .await
        })
    }

    fn run<'a>(&'a self, artifact: &'a Path) -> ToolFuture<'a> {
        Box::pin(async move {
            let (program, args) = match &self.runner {
                Some(runner) => (
                    OsString::from(runner),
                    vec![artifact.as_os_str().to_owned()],
                ),
                None => (artifact.as_os_str().to_owned(), Vec::new()),
            };
            info!(
                cmd = %display_command(&program.to_string_lossy(), &args),
                "running testbench"
            );
            run_captured(program, &args, Some(&self.working_dir)).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_args_follow_iverilog_layout() {
        let request = CompileRequest {
            output: PathBuf::from("/b/a_tb.v.out"),
            dependencies: vec![PathBuf::from("a.v"), PathBuf::from("b.v")],
            primary: PathBuf::from("a_tb.v"),
            flags: vec!["-Wall".to_string()],
        };

        let args: Vec<String> = compile_args(&request)
            .into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();

        assert_eq!(args, vec!["-Wall", "-o/b/a_tb.v.out", "a.v", "b.v", "a_tb.v"]);
    }
}
