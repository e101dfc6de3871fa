mod common;

use std::path::PathBuf;
use std::time::Duration;

use tbwatch::cli::CliArgs;
use tbwatch::config::{load_and_validate, load_for_cli, load_from_path};
use tbwatch::errors::TbwatchError;

#[test]
fn relative_paths_resolve_against_config_and_input_directories() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(tmp.path().join("rtl")).unwrap();
    let config = common::write_file(
        tmp.path(),
        "Tbwatch.toml",
        r#"
input_directory = "rtl"
build_directory = "out"
assets_directory = "skeleton"
tool_flags = ["-Wall", "-g2012"]
runner = "vvp"
watch = true
quiet_period_ms = 250
"#,
    );

    let cfg = load_and_validate(&config).unwrap();
    let rtl = tmp.path().join("rtl").canonicalize().unwrap();

    assert_eq!(cfg.input_directory, rtl);
    assert_eq!(cfg.build_directory, rtl.join("out"));
    assert_eq!(cfg.report_directory, rtl.join("build/report"));
    assert_eq!(cfg.assets_directory, Some(rtl.join("skeleton")));
    assert_eq!(cfg.tool_flags, vec!["-Wall", "-g2012"]);
    assert_eq!(cfg.runner.as_deref(), Some("vvp"));
    assert!(cfg.watch);
    assert_eq!(cfg.quiet_period, Duration::from_millis(250));
}

#[test]
fn missing_input_directory_defaults_to_config_directory() {
    let tmp = tempfile::tempdir().unwrap();
    let config = common::write_file(tmp.path(), "Tbwatch.toml", "compiler = \"iverilog\"\n");

    let cfg = load_and_validate(&config).unwrap();
    assert_eq!(cfg.input_directory, tmp.path().canonicalize().unwrap());
}

#[test]
fn unknown_key_is_a_toml_error() {
    let tmp = tempfile::tempdir().unwrap();
    let config = common::write_file(tmp.path(), "Tbwatch.toml", "input_dir = \".\"\n");

    let err = load_from_path(&config).unwrap_err();
    assert!(matches!(err, TbwatchError::TomlError(_)), "got {err:?}");
    assert!(err.is_validation());
}

#[test]
fn explicit_config_must_exist() {
    let tmp = tempfile::tempdir().unwrap();
    let args = CliArgs {
        config: Some(tmp.path().join("missing.toml")),
        ..CliArgs::default()
    };

    let err = load_for_cli(&args).unwrap_err();
    assert!(matches!(err, TbwatchError::ConfigError(_)));
}

#[test]
fn cli_flags_override_file_values() {
    let tmp = tempfile::tempdir().unwrap();
    let config = common::write_file(
        tmp.path(),
        "Tbwatch.toml",
        "tool_flags = [\"-Wall\"]\nquiet_period_ms = 500\ncompiler = \"iverilog\"\n",
    );
    let build: PathBuf = tmp.path().join("elsewhere/build");

    let args = CliArgs {
        config: Some(config),
        build_dir: Some(build.clone()),
        tool_flags: vec!["-g2012".to_string()],
        compiler: Some("my-iverilog".to_string()),
        quiet_period_ms: Some(30),
        watch: true,
        ..CliArgs::default()
    };

    let cfg = load_for_cli(&args).unwrap();
    assert_eq!(cfg.input_directory, tmp.path().canonicalize().unwrap());
    assert_eq!(cfg.build_directory, build);
    assert_eq!(cfg.tool_flags, vec!["-g2012"]);
    assert_eq!(cfg.compiler, "my-iverilog");
    assert_eq!(cfg.quiet_period, Duration::from_millis(30));
    assert!(cfg.watch);
}

#[test]
fn invalid_pattern_from_cli_is_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    let config = common::write_file(tmp.path(), "Tbwatch.toml", "");
    let args = CliArgs {
        config: Some(config),
        file_pattern: Some("src/[".to_string()),
        ..CliArgs::default()
    };

    let err = load_for_cli(&args).unwrap_err();
    assert!(err.is_validation());
    assert!(err.to_string().contains("file_pattern"));
}
