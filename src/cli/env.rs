use clap::Parser;
use std::path::PathBuf;

use super::commands::Commands;

/// Inspect and replay the AI reply integration against page fixtures.
#[derive(Parser)]
#[command(name = "mailassist", author, version, long_about = None)]
#[command(propagate_version = true)]
pub struct CliArgs {
    /// Configuration file (defaults to config/config.yaml, then the user config dir)
    #[arg(short, long, value_name = "FILE", env = "MAILASSIST_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level, overridden by RUST_LOG
    #[arg(short, long, default_value = "info")]
    pub log_level: String,

    /// Shorthand for --log-level debug
    #[arg(short, long)]
    pub debug: bool,

    /// Output format for probe and selectors reports
    #[arg(short, long, default_value = "human")]
    pub output: crate::cli::output::OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}
