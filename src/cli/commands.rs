// file: src/cli/commands.rs
// version: 2.1.0
// guid: g7h8i9j0-k1l2-3456-7890-123456ghijkl

//! Command implementation for the CLI

use crate::{
    cli::args::Cli,
    collector::TerminalPrompter,
    config::{loader::ConfigLoader, BootstrapConfig},
    executor::LocalExecutor,
    logging::init_logger,
    runner::{self, Gate},
    ui,
    utils::system::{SystemUtils, REQUIRED_TOOLS},
    Result,
};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::signal;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

/// Run one interactive bootstrap session
pub async fn bootstrap_command(cli: &Cli) -> Result<()> {
    let config = ConfigLoader::new().load_or_default(cli.config.as_deref())?;

    SystemUtils::require_root()?;

    let log_file = cli
        .log_file
        .clone()
        .unwrap_or_else(|| config.paths.log_file.clone());
    init_logger(cli.verbose, cli.quiet, &log_file)?;

    let span = info_span!("run", run_id = %Uuid::new_v4());
    run_session(&config, &log_file).instrument(span).await
}

async fn run_session(config: &BootstrapConfig, log_file: &Path) -> Result<()> {
    info!("Configuration loaded, log file {}", log_file.display());

    let missing = SystemUtils::missing_tools(REQUIRED_TOOLS);
    if !missing.is_empty() {
        warn!("Missing tools: {}", missing.join(", "));
        ui::print_warning(&format!(
            "Not found on PATH: {}; steps using them will fail",
            missing.join(", ")
        ));
    }

    let mut prompter = TerminalPrompter::new();
    let plan = match runner::gather(&mut prompter, config)? {
        Gate::Proceed(plan) => plan,
        Gate::Declined | Gate::NothingSelected => return Ok(()),
    };

    // Ctrl+C lets the running step finish so no file is left half-edited
    let stop = Arc::new(AtomicBool::new(false));
    let listener = {
        let stop = Arc::clone(&stop);
        tokio::spawn(async move {
            if signal::ctrl_c().await.is_ok() {
                warn!("Received Ctrl+C, stopping after the current step");
                ui::print_warning("Interrupted; finishing the current step before stopping");
                stop.store(true, Ordering::SeqCst);
            }
        })
    };

    let mut executor = LocalExecutor::new();
    let result = runner::apply_and_verify_until(config, &plan, &mut executor, &stop).await;
    listener.abort();

    let report = result?;
    info!(
        "Run finished: {} step(s) attempted, {}",
        report.steps.len(),
        report.tally.summary()
    );
    Ok(())
}
