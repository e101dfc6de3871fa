// src/logging.rs

//! Logging setup: a `tracing-subscriber` fmt layer on stderr, filtered by an
//! `EnvFilter`.
//!
//! The filter comes from the `--log-level` flag, else from `TBWATCH_LOG`
//! (full filter directives such as `info,tbwatch::watch=debug`), else `info`.
//! Stdout is left for dry-run output and the run summary.

use anyhow::{anyhow, Result};
use tracing_subscriber::filter::Directive;
use tracing_subscriber::EnvFilter;

use crate::cli::LogLevel;

pub const LOG_ENV_VAR: &str = "TBWATCH_LOG";

/// Watcher internals flood `debug`; capped unless named explicitly.
const NOISY_TARGETS: &[(&str, &str)] = &[("notify", "notify=warn"), ("mio", "mio=warn")];

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let env = std::env::var(LOG_ENV_VAR).ok();

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(cli_level, env.as_deref()))
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow!("failed to install log subscriber: {err}"))
}

fn log_filter(cli_level: Option<LogLevel>, env: Option<&str>) -> EnvFilter {
    let base = match (cli_level, env.map(str::trim)) {
        (Some(level), _) => level_directive(level).to_string(),
        (None, Some(directives)) if !directives.is_empty() => directives.to_string(),
        _ => "info".to_string(),
    };

    let mut filter = EnvFilter::builder().parse_lossy(&base);
    for (target, directive) in NOISY_TARGETS {
        if base.contains(target) {
            continue;
        }
        if let Ok(directive) = directive.parse::<Directive>() {
            filter = filter.add_directive(directive);
        }
    }
    filter
}

fn level_directive(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    }
}

#[cfg(test)]
mod tests {
    use tracing::level_filters::LevelFilter;

    use super::*;

    #[test]
    fn cli_level_wins_over_environment() {
        let filter = log_filter(Some(LogLevel::Warn), Some("trace"));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::WARN));
    }

    #[test]
    fn environment_accepts_per_module_directives() {
        let filter = log_filter(None, Some(" info,tbwatch::watch=trace "));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::TRACE));
    }

    #[test]
    fn blank_or_missing_environment_defaults_to_info() {
        assert_eq!(log_filter(None, None).max_level_hint(), Some(LevelFilter::INFO));
        assert_eq!(log_filter(None, Some("  ")).max_level_hint(), Some(LevelFilter::INFO));
    }
}
