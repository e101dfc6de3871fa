use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tbwatch::exec::{CompileRequest, ToolFuture, ToolOutput, Toolchain};

#[derive(Debug, Default)]
struct FakeState {
    compile_codes: HashMap<String, i32>,
    run_codes: HashMap<String, i32>,
    compiles: Vec<CompileRequest>,
    runs: Vec<PathBuf>,
}

/// A fake toolchain that:
/// - records every compile request and every run
/// - answers with scripted exit codes per testbench (default 0)
#[derive(Debug, Clone, Default)]
pub struct FakeToolchain {
    state: Arc<Mutex<FakeState>>,
}

impl FakeToolchain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exit code for compiling the testbench `file` (relative path).
    pub fn compile_exit(self, file: &str, code: i32) -> Self {
        self.state
            .lock()
            .unwrap()
            .compile_codes
            .insert(file.to_string(), code);
        self
    }

    /// Exit code for running the testbench `file` (relative path).
    pub fn run_exit(self, file: &str, code: i32) -> Self {
        self.state
            .lock()
            .unwrap()
            .run_codes
            .insert(file.to_string(), code);
        self
    }

    pub fn compiles(&self) -> Vec<CompileRequest> {
        self.state.lock().unwrap().compiles.clone()
    }

    pub fn runs(&self) -> Vec<PathBuf> {
        self.state.lock().unwrap().runs.clone()
    }
}

fn code_for(codes: &HashMap<String, i32>, path: &Path, suffix: &str) -> i32 {
    codes
        .iter()
        .find(|(file, _)| path.ends_with(format!("{file}{suffix}")))
        .map(|(_, code)| *code)
        .unwrap_or(0)
}

impl Toolchain for FakeToolchain {
    fn compile<'a>(&'a self, request: &'a CompileRequest) -> ToolFuture<'a> {
        Box::pin(async move {
            let mut state = self.state.lock().unwrap();
            state.compiles.push(request.clone());
            let code = code_for(&state.compile_codes, &request.primary, "");
            ToolOutput::new(format!("compiled {}", request.primary.display()), code)
        })
    }

    fn run<'a>(&'a self, artifact: &'a Path) -> ToolFuture<'a> {
        Box::pin(async move {
            let mut state = self.state.lock().unwrap();
            state.runs.push(artifact.to_path_buf());
            let code = code_for(&state.run_codes, artifact, ".out");
            ToolOutput::new(format!("ran {}", artifact.display()), code)
        })
    }
}
