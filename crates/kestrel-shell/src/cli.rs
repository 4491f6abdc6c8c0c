//! CLI argument parsing for kestrel

use clap::Parser;
use std::path::PathBuf;

/// kestrel - A session-restoring multi-window application shell
#[derive(Parser, Debug)]
#[command(name = "kestrel")]
#[command(about = "A session-restoring multi-window application shell")]
#[command(version)]
pub struct Cli {
    /// Location to open in a new window, alongside the restored session
    pub location: Option<String>,

    /// Profile directory (defaults to the platform config directory)
    #[arg(long = "profile-dir")]
    pub profile_dir: Option<PathBuf>,

    /// Keep all session state in memory, never touching the disk
    #[arg(long)]
    pub ephemeral: bool,

    /// Log level
    #[arg(long = "log-level", default_value = "info")]
    pub log_level: String,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
