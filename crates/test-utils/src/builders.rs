#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tbwatch::config::{ConfigFile, RawConfigFile};
use tbwatch::dag::{Task, TaskResults};

/// Builder for `ConfigFile` rooted at an existing input directory.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new(input_directory: impl AsRef<Path>) -> Self {
        Self {
            config: RawConfigFile {
                input_directory: Some(input_directory.as_ref().to_path_buf()),
                ..RawConfigFile::default()
            },
        }
    }

    pub fn build_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.build_directory = Some(dir.into());
        self
    }

    pub fn report_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.report_directory = Some(dir.into());
        self
    }

    pub fn assets_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.assets_directory = Some(dir.into());
        self
    }

    pub fn file_pattern(mut self, pattern: &str) -> Self {
        self.config.file_pattern = Some(pattern.to_string());
        self
    }

    pub fn test_bench_pattern(mut self, pattern: &str) -> Self {
        self.config.test_bench_pattern = Some(pattern.to_string());
        self
    }

    pub fn tool_flag(mut self, flag: &str) -> Self {
        self.config
            .tool_flags
            .get_or_insert_with(Vec::new)
            .push(flag.to_string());
        self
    }

    pub fn runner(mut self, runner: &str) -> Self {
        self.config.runner = Some(runner.to_string());
        self
    }

    pub fn quiet_period(mut self, quiet: Duration) -> Self {
        self.config.quiet_period_ms = Some(quiet.as_millis() as u64);
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

/// Shared log of task names in execution order.
pub type RunLog = Arc<Mutex<Vec<String>>>;

pub fn run_log() -> RunLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn logged(log: &RunLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

/// A task that records its name and returns it, prefixed by the outputs of
/// its dependencies in declaration order (e.g. `"a+b>c"`).
pub fn recording_task(name: &str, deps: &[&str], log: &RunLog) -> Task<String> {
    let log = Arc::clone(log);
    let own = name.to_string();
    let dep_names: Vec<String> = deps.iter().map(|d| d.to_string()).collect();
    Task::new(name, deps, move |inputs: TaskResults<String>| async move {
        log.lock().unwrap().push(own.clone());
        let mut parts = Vec::new();
        for dep in &dep_names {
            parts.push(inputs.get(dep)?.clone());
        }
        if parts.is_empty() {
            Ok(own)
        } else {
            Ok(format!("{}>{}", parts.join("+"), own))
        }
    })
}

/// A task that records its name and then fails.
pub fn failing_task(name: &str, deps: &[&str], log: &RunLog) -> Task<String> {
    let log = Arc::clone(log);
    let own = name.to_string();
    Task::new(name, deps, move |_| async move {
        log.lock().unwrap().push(own.clone());
        anyhow::Result::<String>::Err(anyhow::anyhow!("{own} exploded"))
    })
}
