// file: src/cli/args.rs
// version: 2.0.0
// guid: f6g7h8i9-j0k1-2345-6789-012345fghijk

//! Command line argument definitions

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "vps-bootstrap")]
#[command(about = "Interactive first-boot setup for a fresh Ubuntu/Debian VPS")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Mirror debug logs to the terminal
    #[arg(short, long)]
    pub verbose: bool,

    /// Only print warnings, errors and prompts
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// YAML file overriding paths, service names and fail2ban policy
    #[arg(short, long, env = "VPS_BOOTSTRAP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log file path (defaults to the configured one)
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}
