// src/config/validate.rs

use std::path::{Path, PathBuf};
use std::time::Duration;

use globset::Glob;

use crate::config::model::{
    default_tool_flags, ConfigFile, RawConfigFile, DEFAULT_COMPILER, DEFAULT_FILE_PATTERN,
    DEFAULT_QUIET_PERIOD_MS, DEFAULT_TEST_BENCH_PATTERN,
};
use crate::errors::{Result, TbwatchError};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = TbwatchError;

    /// Apply defaults and validate.
    ///
    /// A missing `input_directory` means the current working directory.
    /// Relative paths are expected to have been resolved by the loader
    /// already; anything still relative is taken relative to the cwd.
    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        let input_directory = validate_input_directory(raw.input_directory)?;

        let build_directory = resolve_under(
            &input_directory,
            raw.build_directory.unwrap_or_else(|| PathBuf::from("build/out")),
        );
        let report_directory = resolve_under(
            &input_directory,
            raw.report_directory
                .unwrap_or_else(|| PathBuf::from("build/report")),
        );
        let assets_directory = raw
            .assets_directory
            .map(|dir| resolve_under(&input_directory, dir));

        let file_pattern = raw
            .file_pattern
            .unwrap_or_else(|| DEFAULT_FILE_PATTERN.to_string());
        let test_bench_pattern = raw
            .test_bench_pattern
            .unwrap_or_else(|| DEFAULT_TEST_BENCH_PATTERN.to_string());
        validate_glob("file_pattern", &file_pattern)?;
        validate_glob("test_bench_pattern", &test_bench_pattern)?;

        let compiler = raw
            .compiler
            .unwrap_or_else(|| DEFAULT_COMPILER.to_string());
        if compiler.trim().is_empty() {
            return Err(TbwatchError::ConfigError(
                "compiler must not be empty".to_string(),
            ));
        }

        let runner = match raw.runner {
            Some(r) if r.trim().is_empty() => {
                return Err(TbwatchError::ConfigError(
                    "runner must not be empty when given".to_string(),
                ));
            }
            other => other,
        };

        let quiet_period_ms = raw.quiet_period_ms.unwrap_or(DEFAULT_QUIET_PERIOD_MS);
        if quiet_period_ms == 0 {
            return Err(TbwatchError::ConfigError(
                "quiet_period_ms must be >= 1 (got 0)".to_string(),
            ));
        }

        Ok(ConfigFile {
            input_directory,
            build_directory,
            report_directory,
            assets_directory,
            file_pattern,
            test_bench_pattern,
            tool_flags: raw.tool_flags.unwrap_or_else(default_tool_flags),
            compiler,
            runner,
            watch: raw.watch.unwrap_or(false),
            quiet_period: Duration::from_millis(quiet_period_ms),
        })
    }
}

fn validate_input_directory(dir: Option<PathBuf>) -> Result<PathBuf> {
    let dir = dir.unwrap_or_else(|| PathBuf::from("."));
    let canonical = dir.canonicalize().map_err(|err| {
        TbwatchError::ConfigError(format!(
            "input directory {} is not readable: {err}",
            dir.display()
        ))
    })?;
    if !canonical.is_dir() {
        return Err(TbwatchError::ConfigError(format!(
            "input directory {} is not a directory",
            dir.display()
        )));
    }
    Ok(canonical)
}

fn resolve_under(base: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}

fn validate_glob(field: &str, pattern: &str) -> Result<()> {
    Glob::new(pattern).map_err(|err| {
        TbwatchError::ConfigError(format!("{field} is not a valid glob: {err}"))
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_in(dir: &Path) -> RawConfigFile {
        RawConfigFile {
            input_directory: Some(dir.to_path_buf()),
            ..RawConfigFile::default()
        }
    }

    #[test]
    fn defaults_are_applied_under_input_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let cfg = ConfigFile::try_from(raw_in(tmp.path())).unwrap();
        let root = tmp.path().canonicalize().unwrap();

        assert_eq!(cfg.input_directory, root);
        assert_eq!(cfg.build_directory, root.join("build/out"));
        assert_eq!(cfg.report_directory, root.join("build/report"));
        assert_eq!(cfg.file_pattern, "**/*.v");
        assert_eq!(cfg.test_bench_pattern, "**/*_tb.v");
        assert_eq!(cfg.tool_flags, vec!["-Wall".to_string()]);
        assert_eq!(cfg.compiler, "iverilog");
        assert_eq!(cfg.runner, None);
        assert!(!cfg.watch);
        assert_eq!(cfg.quiet_period, Duration::from_millis(100));
    }

    #[test]
    fn missing_input_directory_is_a_config_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = ConfigFile::try_from(raw_in(&tmp.path().join("nope"))).unwrap_err();
        assert!(matches!(err, TbwatchError::ConfigError(_)));
        assert!(err.is_validation());
    }

    #[test]
    fn bad_glob_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let raw = RawConfigFile {
            test_bench_pattern: Some("**/[".to_string()),
            ..raw_in(tmp.path())
        };
        let err = ConfigFile::try_from(raw).unwrap_err();
        assert!(err.to_string().contains("test_bench_pattern"));
    }

    #[test]
    fn zero_quiet_period_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let raw = RawConfigFile {
            quiet_period_ms: Some(0),
            ..raw_in(tmp.path())
        };
        assert!(ConfigFile::try_from(raw).is_err());
    }

    #[test]
    fn empty_compiler_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let raw = RawConfigFile {
            compiler: Some("  ".to_string()),
            ..raw_in(tmp.path())
        };
        assert!(ConfigFile::try_from(raw).is_err());
    }
}
