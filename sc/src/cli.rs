//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

/// StepCalc - staged arithmetic with a separate progress monitor
#[derive(Parser)]
#[command(
    name = "sc",
    about = "Add and subtract within 0-10 through a staged, progress-reporting pipeline",
    version
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the interactive calculator (default)
    Repl {
        /// Don't launch a monitor even if autostart is configured
        #[arg(long)]
        no_monitor: bool,
    },

    /// Evaluate a single expression such as "3 + 5"
    Eval {
        /// Expression: <a> <op> <b>
        expr: String,

        /// Skip artificial work delays
        #[arg(long)]
        fast: bool,
    },

    /// Internal: Render progress from the channel (used by the REPL launcher)
    #[command(hide = true)]
    Monitor {
        /// Channel file to watch
        #[arg(long)]
        channel: Option<PathBuf>,

        /// Poll interval in milliseconds
        #[arg(short, long)]
        interval: Option<u64>,

        /// Wait for Enter before closing after the exit signal
        #[arg(long)]
        hold: bool,
    },
}

/// Get the log file path
pub fn get_log_path() -> PathBuf {
    let path = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("stepcalc")
        .join("logs")
        .join("stepcalc.log");
    debug!(?path, "get_log_path: returning path");
    path
}
