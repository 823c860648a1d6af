// src/logging.rs

//! Logging for `persistrig`: a `tracing-subscriber` fmt layer on stderr.
//!
//! stdout carries the emitted messages, so nothing else may write there.
//!
//! The filter comes from `--log-level` when given. Otherwise the
//! `PERSISTRIG_LOG` variable is read as a full `EnvFilter` directive string
//! (`debug`, `persistrig::engine=trace,warn`, ...). Without either, `info`.

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;

use crate::cli::LogLevel;

/// Environment variable holding filter directives.
pub const LOG_ENV: &str = "PERSISTRIG_LOG";

const DEFAULT_DIRECTIVE: &str = "info";

/// Install the global subscriber. Call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let filter = build_filter(cli_level, std::env::var(LOG_ENV).ok().as_deref())?;

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("installing log subscriber: {e}"))
}

fn build_filter(cli_level: Option<LogLevel>, env_directives: Option<&str>) -> Result<EnvFilter> {
    if let Some(level) = cli_level {
        return Ok(EnvFilter::new(level.as_directive()));
    }
    match env_directives.map(str::trim).filter(|s| !s.is_empty()) {
        Some(directives) => EnvFilter::try_new(directives)
            .with_context(|| format!("invalid {LOG_ENV} value {directives:?}")),
        None => Ok(EnvFilter::new(DEFAULT_DIRECTIVE)),
    }
}

impl LogLevel {
    fn as_directive(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_level_wins_over_env() {
        let filter = build_filter(Some(LogLevel::Debug), Some("error")).unwrap();
        assert_eq!(filter.to_string(), "debug");
    }

    #[test]
    fn env_directives_and_default() {
        let filter = build_filter(None, Some(" persistrig::engine=trace,warn ")).unwrap();
        assert!(filter.to_string().contains("persistrig::engine=trace"));

        assert_eq!(build_filter(None, None).unwrap().to_string(), "info");
        assert_eq!(build_filter(None, Some("  ")).unwrap().to_string(), "info");
    }

    #[test]
    fn bad_directives_are_rejected() {
        assert!(build_filter(None, Some("persistrig=loud")).is_err());
    }
}
