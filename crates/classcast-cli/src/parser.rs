//! Main CLI parser and top-level argument handling.

use std::path::PathBuf;

use clap::Parser;

use crate::commands::Commands;

/// Command-line interface for the classcast relay.
#[derive(Parser)]
#[command(name = "classcast")]
#[command(about = "WebRTC signaling relay for live classes")]
#[command(version)]
pub struct Cli {
    /// Settings file (JSON)
    #[arg(short = 'c', long = "config", global = true, env = "CLASSCAST_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}
