// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::default_config_path;

/// Command-line arguments for `reswatch`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "reswatch",
    version,
    about = "Invalidate cached group artifacts when their scripts or stylesheets change.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the model file (TOML).
    #[arg(long, value_name = "PATH", default_value_os_t = default_config_path())]
    pub config: PathBuf,

    /// Run a single check cycle and exit.
    #[arg(long)]
    pub once: bool,

    /// Only check this group (default: every group in the model).
    #[arg(long, value_name = "NAME")]
    pub group: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `RESWATCH_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Validate the model and print the flattened groups, without checking.
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

pub fn parse() -> CliArgs {
    CliArgs::parse()
}
