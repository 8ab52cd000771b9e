// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `scriptvisor`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "scriptvisor",
    version,
    about = "Run interpreter scripts under supervision and cancel them gracefully.",
    long_about = None
)]
pub struct CliArgs {
    /// Scripts to run. They are started concurrently.
    #[arg(value_name = "SCRIPT", required = true)]
    pub scripts: Vec<PathBuf>,

    /// Path to the config file (TOML).
    ///
    /// Default: `Scriptvisor.toml` in the current working directory, if it
    /// exists.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Interpreter command, e.g. "/usr/bin/env python3".
    ///
    /// Overrides `[interpreter].command` from the config file.
    #[arg(long, value_name = "CMD")]
    pub interpreter: Option<String>,

    /// Cancel every script still running after this long (e.g. "30s").
    #[arg(long, value_name = "DURATION")]
    pub timeout: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `SCRIPTVISOR_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Resolve scripts and the interpreter, print them, but don't run anything.
    #[arg(long)]
    pub dry_run: bool,
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
