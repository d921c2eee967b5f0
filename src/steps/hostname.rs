// file: src/steps/hostname.rs
// version: 1.0.0
// guid: 3f8a1c6e-4d20-4b9a-8e57-c6b0d2a1f934

//! Hostname step: `hostnamectl` plus the hosts-file loopback alias

use super::{SetupStep, StepContext, StepOutcome};
use crate::config::plan::validate_hostname;
use crate::config::SetupPlan;
use crate::error::Result;
use crate::executor::CommandExecutor;
use crate::utils::files;
use crate::verify::CheckResult;
use std::io::ErrorKind;
use std::path::Path;
use tracing::info;

pub struct HostnameStep;

/// Read a text file, treating a missing file as empty
pub(crate) async fn read_or_empty(path: &Path) -> Result<String> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => Ok(content),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(String::new()),
        Err(e) => Err(e.into()),
    }
}

#[async_trait::async_trait]
impl SetupStep for HostnameStep {
    fn name(&self) -> &str {
        "hostname"
    }

    fn is_requested(&self, plan: &SetupPlan) -> bool {
        plan.hostname.is_some()
    }

    async fn apply(
        &self,
        ctx: &StepContext<'_>,
        exec: &mut dyn CommandExecutor,
    ) -> Result<StepOutcome> {
        let Some(hostname) = ctx.plan.hostname.as_deref() else {
            return Ok(StepOutcome::Skipped("no hostname requested".to_string()));
        };
        if let Err(e) = validate_hostname(hostname) {
            return Ok(StepOutcome::Failed(e));
        }

        exec.execute("hostnamectl", &["set-hostname", hostname]).await?;

        let hosts_path = &ctx.config.paths.hosts_file;
        let hosts = read_or_empty(hosts_path).await?;
        let updated = files::set_loopback_alias(&hosts, hostname);
        if updated != hosts {
            tokio::fs::write(hosts_path, updated).await?;
            info!("Updated loopback alias in {}", hosts_path.display());
        }

        Ok(StepOutcome::Applied(format!("Hostname set to {}", hostname)))
    }

    async fn verify(
        &self,
        ctx: &StepContext<'_>,
        exec: &mut dyn CommandExecutor,
    ) -> Result<Vec<CheckResult>> {
        let Some(expected) = ctx.plan.hostname.as_deref() else {
            return Ok(Vec::new());
        };

        let output = exec.run_raw("hostname", &[], None).await?;
        let actual = output.stdout.trim();
        let check = if output.success() && actual == expected {
            CheckResult::pass("hostname", format!("hostname is {}", actual))
        } else if output.success() {
            CheckResult::fail(
                "hostname",
                format!("expected {}, found {}", expected, actual),
            )
        } else {
            CheckResult::fail(
                "hostname",
                format!("hostname query failed: {}", output.diagnostic()),
            )
        };
        Ok(vec![check])
    }
}
