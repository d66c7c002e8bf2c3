//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

/// Relay a file from a direct URL into Drime Cloud.
///
/// Downloads the file, uploads it with your Drime API token, and prints a
/// public share link.
#[derive(Parser, Debug)]
#[command(name = "drime-relay")]
#[command(author, version, about)]
pub struct Args {
    /// Direct download URL (read from stdin when omitted)
    pub url: Option<String>,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Print the full result as JSON instead of the bare share link
    #[arg(long)]
    pub json: bool,

    /// Disable the progress bar
    #[arg(long)]
    pub no_progress: bool,

    /// Config file path (default: $XDG_CONFIG_HOME/drime-relay/config.toml)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}
