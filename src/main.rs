// file: src/main.rs
// version: 2.0.0
// guid: h8i9j0k1-l2m3-4567-8901-234567hijklm

//! vps-bootstrap - Main entry point

use clap::Parser;
use std::process::ExitCode;
use tracing::error;
use vps_bootstrap::{
    cli::{bootstrap_command, Cli},
    ui,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match bootstrap_command(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ui::print_error(&e.to_string());
            ExitCode::from(e.exit_code())
        }
    }
}
