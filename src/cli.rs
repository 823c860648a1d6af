// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `persistrig`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "persistrig",
    version,
    about = "Delay, repeat or hold back JSON events per key, surviving restarts.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the trigger config file (TOML).
    #[arg(long, value_name = "PATH", default_value = "Persistrig.toml")]
    pub config: String,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `PERSISTRIG_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print the config and persisted entries, then exit.
    #[arg(long)]
    pub dry_run: bool,

    /// On exit, delete this instance's persisted entries instead of keeping
    /// them for the next start.
    #[arg(long)]
    pub remove_on_exit: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
