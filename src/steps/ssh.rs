// file: src/steps/ssh.rs
// version: 1.1.0
// guid: b1e7d3a9-6c42-4f08-9a5b-e2c4f8d0a716

//! SSH step: root password and listening port
//!
//! A port change is only made live after `sshd -t` accepts the edited config.
//! When the check rejects it, or any step between the backup and the check
//! errors out, the backup taken moments earlier is copied back.

use super::{packages, SetupStep, StepContext, StepOutcome};
use crate::config::{Secret, SetupPlan};
use crate::error::{Result, SetupError};
use crate::executor::{CommandExecutor, CommandOutput};
use crate::utils::files;
use crate::verify::CheckResult;
use std::path::PathBuf;
use tracing::{error, info};

pub struct SshStep;

/// What happened to a requested port change
#[derive(Debug)]
enum PortChange {
    Applied { backup: PathBuf },
    RolledBack(SetupError),
}

impl SshStep {
    async fn change_password(
        ctx: &StepContext<'_>,
        exec: &mut dyn CommandExecutor,
        password: &Secret,
    ) -> Result<()> {
        let user = ctx.config.password_user.as_str();
        let line = format!("{}:{}\n", user, password.expose());
        exec.execute_with_input("chpasswd", &[], &line).await?;
        info!("Password updated for {}", user);
        Ok(())
    }

    /// Write the new port and run the syntax check on the result
    async fn stage_port(
        ctx: &StepContext<'_>,
        exec: &mut dyn CommandExecutor,
        port: u16,
    ) -> Result<CommandOutput> {
        let paths = &ctx.config.paths;
        let config_arg = paths.sshd_config.display().to_string();
        let current = tokio::fs::read_to_string(&paths.sshd_config).await?;
        tokio::fs::write(&paths.sshd_config, files::replace_port_directive(&current, port)).await?;
        tokio::fs::create_dir_all(&paths.sshd_privsep_dir).await?;
        exec.run_raw("sshd", &["-t", "-f", &config_arg], None).await
    }

    async fn change_port(
        ctx: &StepContext<'_>,
        exec: &mut dyn CommandExecutor,
        port: u16,
    ) -> Result<PortChange> {
        let service = ctx.config.services.ssh_service.as_str();
        let config_path = &ctx.config.paths.sshd_config;
        let config_arg = config_path.display().to_string();

        // One timestamp serves both the backup and any restore
        let backup = files::backup_path(config_path, chrono::Utc::now().timestamp());
        tokio::fs::copy(config_path, &backup).await?;
        info!("Backed up {} to {}", config_arg, backup.display());

        let check = match Self::stage_port(ctx, exec, port).await {
            Ok(check) => check,
            Err(e) => {
                error!("Port change aborted: {}; restoring {}", e, backup.display());
                if let Err(restore) = tokio::fs::copy(&backup, config_path).await {
                    error!("Could not restore {}: {}", config_arg, restore);
                }
                return Err(e);
            }
        };
        if check.success() {
            exec.execute("systemctl", &["restart", service]).await?;
            info!("sshd now listening on port {}", port);
            return Ok(PortChange::Applied { backup });
        }

        error!(
            "sshd rejected the new config: {}; restoring {}",
            check.diagnostic(),
            backup.display()
        );
        tokio::fs::copy(&backup, config_path).await?;
        exec.execute("systemctl", &["restart", service]).await?;

        Ok(PortChange::RolledBack(SetupError::recovered(format!(
            "sshd config check failed ({}); previous config restored from {}",
            check.diagnostic(),
            backup.display()
        ))))
    }

    async fn verify_port(
        ctx: &StepContext<'_>,
        exec: &mut dyn CommandExecutor,
        port: u16,
    ) -> Result<CheckResult> {
        let config_path = &ctx.config.paths.sshd_config;
        let content = match tokio::fs::read_to_string(config_path).await {
            Ok(content) => content,
            Err(e) => {
                return Ok(CheckResult::fail(
                    "ssh port",
                    format!("could not read {}: {}", config_path.display(), e),
                ))
            }
        };

        let configured = files::last_port_directive(&content);
        if configured != Some(port) {
            let found = configured.map_or_else(|| "none".to_string(), |p| p.to_string());
            return Ok(CheckResult::fail(
                "ssh port",
                format!("expected Port {}, config has {}", port, found),
            ));
        }

        let config_arg = config_path.display().to_string();
        let check = exec.run_raw("sshd", &["-t", "-f", &config_arg], None).await?;
        if check.success() {
            Ok(CheckResult::pass(
                "ssh port",
                format!("Port {} configured and syntax check passed", port),
            ))
        } else {
            Ok(CheckResult::fail(
                "ssh port",
                format!("syntax check failed: {}", check.diagnostic()),
            ))
        }
    }

    async fn verify_password(
        ctx: &StepContext<'_>,
        exec: &mut dyn CommandExecutor,
    ) -> Result<CheckResult> {
        let user = ctx.config.password_user.as_str();
        let output = exec.run_raw("passwd", &["-S", user], None).await?;
        let status = output.stdout.split_whitespace().nth(1);
        if output.success() && status == Some("P") {
            Ok(CheckResult::pass(
                "ssh password",
                format!("{} has a usable password", user),
            ))
        } else {
            Ok(CheckResult::warn(
                "ssh password",
                format!("could not confirm the password for {}", user),
            ))
        }
    }
}

#[async_trait::async_trait]
impl SetupStep for SshStep {
    fn name(&self) -> &str {
        "ssh"
    }

    fn is_requested(&self, plan: &SetupPlan) -> bool {
        plan.ssh_port.is_some() || plan.ssh_password.is_some()
    }

    async fn apply(
        &self,
        ctx: &StepContext<'_>,
        exec: &mut dyn CommandExecutor,
    ) -> Result<StepOutcome> {
        if !self.is_requested(ctx.plan) {
            return Ok(StepOutcome::Skipped("no SSH changes requested".to_string()));
        }
        if ctx.plan.ssh_port == Some(0) {
            return Ok(StepOutcome::Failed(SetupError::validation(
                "SSH port 0 is outside the range 1-65535",
            )));
        }

        packages::ensure_installed(exec, &ctx.config.services.ssh_package).await?;

        let mut done = Vec::new();
        if let Some(password) = &ctx.plan.ssh_password {
            Self::change_password(ctx, exec, password).await?;
            done.push(format!(
                "password changed for {}",
                ctx.config.password_user.as_str()
            ));
        }

        if let Some(port) = ctx.plan.ssh_port {
            match Self::change_port(ctx, exec, port).await? {
                PortChange::Applied { backup } => done.push(format!(
                    "port set to {} (backup at {})",
                    port,
                    backup.display()
                )),
                PortChange::RolledBack(err) => return Ok(StepOutcome::Failed(err)),
            }
        }

        Ok(StepOutcome::Applied(format!("SSH {}", done.join(", "))))
    }

    async fn verify(
        &self,
        ctx: &StepContext<'_>,
        exec: &mut dyn CommandExecutor,
    ) -> Result<Vec<CheckResult>> {
        let mut checks = Vec::new();
        if let Some(port) = ctx.plan.ssh_port {
            checks.push(Self::verify_port(ctx, exec, port).await?);
        }
        if ctx.plan.ssh_password.is_some() {
            checks.push(Self::verify_password(ctx, exec).await?);
        }
        Ok(checks)
    }
}
