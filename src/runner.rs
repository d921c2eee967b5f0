// file: src/runner.rs
// version: 1.1.0
// guid: 4e2b8d6f-1a05-4c97-8f3e-b6d0a9c1e742

//! The bootstrap pipeline: collect, confirm, apply, verify

use crate::collector::{collect_plan, Prompter};
use crate::config::{BootstrapConfig, SetupPlan};
use crate::error::{Result, SetupError};
use crate::executor::CommandExecutor;
use crate::steps::{default_steps, StepContext, StepOutcome};
use crate::ui;
use crate::verify::{CheckResult, CheckStatus, VerificationTally};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, info_span, warn, Instrument};

/// Result of the collection and confirmation stages
#[derive(Debug)]
pub enum Gate {
    /// Administrator confirmed a non-empty plan
    Proceed(SetupPlan),
    /// Administrator declined the confirmation prompt
    Declined,
    /// Every question was answered "no"
    NothingSelected,
}

/// Outcome of one applied step
#[derive(Debug)]
pub struct StepReport {
    pub name: String,
    pub outcome: StepOutcome,
}

/// Everything the apply and verify stages produced
#[derive(Debug, Default)]
pub struct RunReport {
    pub steps: Vec<StepReport>,
    pub checks: Vec<CheckResult>,
    pub tally: VerificationTally,
}

/// Collect the plan, echo it, and ask for confirmation
pub fn gather(prompter: &mut dyn Prompter, config: &BootstrapConfig) -> Result<Gate> {
    ui::print_header("VPS bootstrap");
    let plan = collect_plan(prompter, config.password_user.as_str())?;

    if plan.is_empty() {
        info!("Nothing selected");
        ui::print_info("No changes selected; nothing to do.");
        return Ok(Gate::NothingSelected);
    }

    ui::print_header("Planned changes");
    for line in plan.describe() {
        ui::print_info(&line);
    }

    if !prompter.confirm("Apply these changes?")? {
        info!("Plan declined at confirmation");
        ui::print_warning("Aborted; no changes were made.");
        return Ok(Gate::Declined);
    }

    Ok(Gate::Proceed(plan))
}

/// Apply every requested step in order, then verify each one
pub async fn apply_and_verify(
    config: &BootstrapConfig,
    plan: &SetupPlan,
    exec: &mut dyn CommandExecutor,
) -> Result<RunReport> {
    apply_and_verify_until(config, plan, exec, &AtomicBool::new(false)).await
}

fn stop_requested(stop: &AtomicBool, next: &str) -> Result<()> {
    if stop.load(Ordering::SeqCst) {
        warn!("Interrupted, not starting {}", next);
        return Err(SetupError::Interrupted);
    }
    Ok(())
}

/// [`apply_and_verify`], stopping at the next step boundary once `stop` is set
///
/// A step that is already running always finishes, so no step is left
/// half-applied.
pub async fn apply_and_verify_until(
    config: &BootstrapConfig,
    plan: &SetupPlan,
    exec: &mut dyn CommandExecutor,
    stop: &AtomicBool,
) -> Result<RunReport> {
    let ctx = StepContext { config, plan };
    let steps = default_steps();
    let requested: Vec<_> = steps.iter().filter(|s| s.is_requested(plan)).collect();
    let mut report = RunReport::default();

    for step in &requested {
        stop_requested(stop, step.name())?;
        ui::print_header(&format!("Applying {}", step.name()));
        let span = info_span!("step", name = step.name());
        let outcome = match step.apply(&ctx, exec).instrument(span).await {
            Ok(outcome) => outcome,
            Err(e) if e.is_step_local() => StepOutcome::Failed(e),
            Err(e) => return Err(e),
        };

        match &outcome {
            StepOutcome::Applied(msg) => {
                info!("{}: {}", step.name(), msg);
                ui::print_success(msg);
            }
            StepOutcome::Skipped(reason) => {
                info!("{} skipped: {}", step.name(), reason);
                ui::print_info(reason);
            }
            StepOutcome::Failed(err) => {
                warn!("{} failed: {}", step.name(), err);
                ui::print_error(&err.to_string());
            }
        }

        report.steps.push(StepReport {
            name: step.name().to_string(),
            outcome,
        });
    }

    stop_requested(stop, "verification")?;
    ui::print_header("Verification");
    for step in &requested {
        let span = info_span!("verify", name = step.name());
        let checks = step.verify(&ctx, exec).instrument(span).await?;
        for check in checks {
            info!("{} [{}] {}", check.status, check.name, check.detail);
            let line = format!("{} {}: {}", check.status, check.name, check.detail);
            match check.status {
                CheckStatus::Pass => ui::print_success(&line),
                CheckStatus::Warn => ui::print_warning(&line),
                CheckStatus::Fail => ui::print_error(&line),
            }
            report.tally.record(&check);
            report.checks.push(check);
        }
    }

    let summary = report.tally.summary();
    info!("{}", summary);
    if report.tally.failed > 0 {
        ui::print_error(&summary);
    } else if report.tally.warned > 0 {
        ui::print_warning(&summary);
    } else {
        ui::print_success(&summary);
    }

    Ok(report)
}

/// Full pipeline; `None` when nothing was applied
pub async fn run(
    config: &BootstrapConfig,
    prompter: &mut dyn Prompter,
    exec: &mut dyn CommandExecutor,
) -> Result<Option<RunReport>> {
    match gather(prompter, config)? {
        Gate::Proceed(plan) => Ok(Some(apply_and_verify(config, &plan, exec).await?)),
        Gate::Declined | Gate::NothingSelected => Ok(None),
    }
}
