//! CLI argument parsing for progchan

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "pc")]
#[command(author, version, about = "Last-write-wins progress channel", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Slot file (overrides config)
    #[arg(short = 'p', long)]
    pub channel: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Watch the channel and render progress until the exit sentinel arrives
    Watch {
        /// Poll interval in milliseconds
        #[arg(short, long)]
        interval: Option<u64>,

        /// Wait for Enter before closing after the exit sentinel
        #[arg(long)]
        hold: bool,
    },

    /// Print the current slot content once
    Show,

    /// Publish the exit sentinel
    Exit,

    /// Remove the slot file
    Clear,
}
