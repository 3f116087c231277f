// src/logging.rs

//! `tracing` subscriber setup for the `tracker` binary.
//!
//! The filter is chosen from, in order:
//! 1. `--log-level` (applies to every target)
//! 2. `TRACKER_LOG`, in `EnvFilter` directive syntax
//!    (`debug`, `tracker::launch=trace,info`, ...)
//! 3. `info`
//!
//! Output goes to stderr; stdout carries only command results such as
//! created ids and run counts.

use anyhow::{Result, anyhow};
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::LogLevel;

pub const LOG_ENV_VAR: &str = "TRACKER_LOG";
pub const DEFAULT_DIRECTIVES: &str = "info";

/// Pick the filter directives from the CLI flag and the env var value.
pub fn filter_directives(cli_level: Option<LogLevel>, env_value: Option<&str>) -> String {
    if let Some(level) = cli_level {
        return level_directive(level).to_string();
    }
    env_value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(DEFAULT_DIRECTIVES)
        .to_string()
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

/// Install the global subscriber. Call once at startup.
///
/// A malformed `TRACKER_LOG` falls back to the default filter with a warning
/// rather than aborting the command.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let env_value = std::env::var(LOG_ENV_VAR).ok();
    let directives = filter_directives(cli_level, env_value.as_deref());

    let (filter, rejected) = match EnvFilter::try_new(&directives) {
        Ok(filter) => (filter, None),
        Err(err) => (EnvFilter::new(DEFAULT_DIRECTIVES), Some(err)),
    };

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("failed to install logger: {e}"))?;

    if let Some(err) = rejected {
        warn!(%directives, error = %err, "ignoring invalid {LOG_ENV_VAR}");
    }
    Ok(())
}
