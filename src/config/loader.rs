// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::cli::CliArgs;
use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{Result, TbwatchError};

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** apply defaults or
/// perform semantic validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path, resolve its relative input directory
/// against the file's own directory, and validate it.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let path = path.as_ref();
    let mut raw = load_from_path(path)?;
    anchor_input_directory(&mut raw, path);
    ConfigFile::try_from(raw)
}

/// Build the effective configuration for a CLI invocation.
///
/// - `--config PATH` must exist.
/// - Without `--config`, `Tbwatch.toml` in the cwd is used when present,
///   otherwise defaults apply.
/// - CLI flags override file values.
pub fn load_for_cli(args: &CliArgs) -> Result<ConfigFile> {
    let mut raw = match &args.config {
        Some(path) => {
            if !path.is_file() {
                return Err(TbwatchError::ConfigError(format!(
                    "config file {} does not exist",
                    path.display()
                )));
            }
            let mut raw = load_from_path(path)?;
            anchor_input_directory(&mut raw, path);
            raw
        }
        None => {
            let path = default_config_path();
            if path.is_file() {
                debug!(path = %path.display(), "using default config file");
                let mut raw = load_from_path(&path)?;
                anchor_input_directory(&mut raw, &path);
                raw
            } else {
                RawConfigFile::default()
            }
        }
    };

    apply_cli_overrides(&mut raw, args);
    ConfigFile::try_from(raw)
}

/// Overlay CLI flags onto a raw config.
pub fn apply_cli_overrides(raw: &mut RawConfigFile, args: &CliArgs) {
    if let Some(dir) = &args.input_dir {
        raw.input_directory = Some(dir.clone());
    }
    // Directories given on the command line are relative to the cwd, not to
    // the input directory.
    if let Some(dir) = &args.build_dir {
        raw.build_directory = Some(absolute_from_cwd(dir));
    }
    if let Some(dir) = &args.report_dir {
        raw.report_directory = Some(absolute_from_cwd(dir));
    }
    if let Some(dir) = &args.assets_dir {
        raw.assets_directory = Some(absolute_from_cwd(dir));
    }
    if let Some(p) = &args.file_pattern {
        raw.file_pattern = Some(p.clone());
    }
    if let Some(p) = &args.test_bench_pattern {
        raw.test_bench_pattern = Some(p.clone());
    }
    if !args.tool_flags.is_empty() {
        raw.tool_flags = Some(args.tool_flags.clone());
    }
    if let Some(c) = &args.compiler {
        raw.compiler = Some(c.clone());
    }
    if let Some(r) = &args.runner {
        raw.runner = Some(r.clone());
    }
    if args.watch {
        raw.watch = Some(true);
    }
    if let Some(ms) = args.quiet_period_ms {
        raw.quiet_period_ms = Some(ms);
    }
}

fn anchor_input_directory(raw: &mut RawConfigFile, config_path: &Path) {
    let base = config_root_dir(config_path);
    raw.input_directory = Some(match raw.input_directory.take() {
        Some(dir) if dir.is_relative() => base.join(dir),
        Some(dir) => dir,
        None => base,
    });
}

fn absolute_from_cwd(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(_) => path.to_path_buf(),
    }
}

/// Directory a config file lives in.
///
/// A bare filename like "Tbwatch.toml" (parent = "") maps to ".".
fn config_root_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// The config file looked up when `--config` is not given.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Tbwatch.toml")
}
