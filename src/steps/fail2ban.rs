// file: src/steps/fail2ban.rs
// version: 1.1.0
// guid: 0e9c4a72-b5d1-4e38-a6f9-3d7b1c8e5a20

//! Fail2ban step: install, write the sshd jail, enable and restart

use super::hostname::read_or_empty;
use super::{packages, SetupStep, StepContext, StepOutcome};
use crate::config::SetupPlan;
use crate::error::Result;
use crate::executor::CommandExecutor;
use crate::utils::files;
use crate::verify::CheckResult;
use tracing::{info, warn};

pub struct Fail2banStep;

impl Fail2banStep {
    /// The requested SSH port, but only if sshd_config actually carries it
    async fn applied_ssh_port(ctx: &StepContext<'_>) -> Result<Option<u16>> {
        let Some(requested) = ctx.plan.ssh_port else {
            return Ok(None);
        };
        let content = read_or_empty(&ctx.config.paths.sshd_config).await?;
        let active = files::last_port_directive(&content);
        if active == Some(requested) {
            Ok(Some(requested))
        } else {
            warn!(
                "SSH port {} is not in {}, leaving it out of the jail",
                requested,
                ctx.config.paths.sshd_config.display()
            );
            Ok(None)
        }
    }
}

#[async_trait::async_trait]
impl SetupStep for Fail2banStep {
    fn name(&self) -> &str {
        "fail2ban"
    }

    fn is_requested(&self, plan: &SetupPlan) -> bool {
        plan.fail2ban_enabled
    }

    async fn apply(
        &self,
        ctx: &StepContext<'_>,
        exec: &mut dyn CommandExecutor,
    ) -> Result<StepOutcome> {
        if !ctx.plan.fail2ban_enabled {
            return Ok(StepOutcome::Skipped("fail2ban not requested".to_string()));
        }
        let services = &ctx.config.services;

        packages::ensure_installed(exec, &services.fail2ban_package).await?;

        let ssh_port = Self::applied_ssh_port(ctx).await?;
        let ports = ctx.config.fail2ban.protected_ports(ssh_port);
        let jail = files::render_sshd_jail(&ctx.config.fail2ban, &ports);
        let jail_path = &ctx.config.paths.fail2ban_jail;
        if let Some(parent) = jail_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(jail_path, jail).await?;
        info!("Wrote sshd jail to {}", jail_path.display());

        let service = services.fail2ban_service.as_str();
        exec.execute("systemctl", &["enable", service]).await?;
        exec.execute("systemctl", &["restart", service]).await?;

        let ports = ports
            .iter()
            .map(u16::to_string)
            .collect::<Vec<_>>()
            .join(",");
        Ok(StepOutcome::Applied(format!(
            "fail2ban sshd jail protecting port(s) {}",
            ports
        )))
    }

    async fn verify(
        &self,
        ctx: &StepContext<'_>,
        exec: &mut dyn CommandExecutor,
    ) -> Result<Vec<CheckResult>> {
        if !ctx.plan.fail2ban_enabled {
            return Ok(Vec::new());
        }

        let service = ctx.config.services.fail2ban_service.as_str();
        let output = exec.run_raw("systemctl", &["is-active", service], None).await?;
        let state = output.stdout.trim();
        let check = if output.success() && state == "active" {
            CheckResult::pass("fail2ban", format!("{} is active", service))
        } else {
            let state = if state.is_empty() { output.diagnostic() } else { state };
            CheckResult::fail("fail2ban", format!("{} is {}", service, state))
        };
        Ok(vec![check])
    }
}
