use std::fmt;
use std::path::PathBuf;

/// A testbench together with everything it is compiled against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestUnit {
    /// Testbench path relative to the input directory, `/` separated.
    pub file: String,
    /// Every discovered non-testbench file, in discovery order.
    pub dependencies: Vec<String>,
    /// Compiled output: `<build>/<file>.out`.
    pub artifact: PathBuf,
}

/// Verdict for one test unit, derived from exit codes only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Success,
    CompileFailed,
    RunFailed,
}

impl Classification {
    /// `run_exit_code` is `None` when the run step never happened.
    pub fn from_exit_codes(compile_exit_code: i32, run_exit_code: Option<i32>) -> Self {
        if compile_exit_code != 0 {
            return Classification::CompileFailed;
        }
        match run_exit_code {
            Some(0) => Classification::Success,
            _ => Classification::RunFailed,
        }
    }

    pub fn is_success(self) -> bool {
        self == Classification::Success
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Classification::Success => "success",
            Classification::CompileFailed => "compile failed",
            Classification::RunFailed => "run failed",
        };
        f.write_str(s)
    }
}

/// Everything recorded about one unit after compile, run and analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitResult {
    pub name: String,
    pub compile_output: String,
    pub compile_exit_code: i32,
    /// `None` when compilation failed and the testbench never ran.
    pub run_output: Option<String>,
    pub run_exit_code: Option<i32>,
    pub classification: Classification,
}
