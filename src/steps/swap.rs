// file: src/steps/swap.rs
// version: 1.1.0
// guid: 8d5e0b7c-a931-4f26-b4d8-1c7e3a9f6052

//! Swap step: allocate, format, activate and persist a swap file

use super::hostname::read_or_empty;
use super::{SetupStep, StepContext, StepOutcome};
use crate::config::plan::MAX_SWAP_SIZE_MB;
use crate::config::SetupPlan;
use crate::error::{Result, SetupError};
use crate::executor::CommandExecutor;
use crate::utils::{files, SystemUtils};
use crate::verify::CheckResult;
use std::path::Path;
use tracing::{debug, info, warn};

/// Free space required beyond the swap file itself
pub const SWAP_HEADROOM_MB: u64 = 100;

/// Slack allowed between requested size and `SwapTotal` (the swap header page)
const SWAP_TOLERANCE_KB: u64 = 1024;

pub struct SwapStep;

impl SwapStep {
    /// Space an existing swap file will give back once it is replaced
    async fn reclaimable_mb(swap_file: &Path) -> u64 {
        match tokio::fs::metadata(swap_file).await {
            Ok(meta) => meta.len() / (1024 * 1024),
            Err(_) => 0,
        }
    }

    /// Turn off and delete a previous swap file at the same path
    ///
    /// A failed `swapoff` is only tolerated when the file is not listed in
    /// `swaps`; an active swap file is never deleted.
    async fn remove_existing(
        exec: &mut dyn CommandExecutor,
        swap_file: &Path,
        swaps: &Path,
    ) -> Result<()> {
        if !swap_file.exists() {
            return Ok(());
        }
        let path = swap_file.display().to_string();
        let output = exec.run_raw("swapoff", &[&path], None).await?;
        if !output.success() {
            if SystemUtils::is_swap_active(swaps, swap_file).await? {
                return Err(SetupError::Process {
                    command: format!("swapoff {}", path),
                    exit_code: output.status,
                    stderr: output.diagnostic().to_string(),
                });
            }
            debug!("{} was not active: {}", path, output.diagnostic());
        }
        tokio::fs::remove_file(swap_file).await?;
        info!("Removed previous swap file {}", path);
        Ok(())
    }

    /// fallocate, falling back to a zero-filled copy when unsupported
    async fn allocate(exec: &mut dyn CommandExecutor, path: &str, size_mb: u64) -> Result<()> {
        let size = format!("{}M", size_mb);
        let fast = exec.run_raw("fallocate", &["-l", &size, path], None).await?;
        if fast.success() {
            return Ok(());
        }

        warn!(
            "fallocate failed ({}), falling back to dd",
            fast.diagnostic()
        );
        let of = format!("of={}", path);
        let count = format!("count={}", size_mb);
        exec.execute("dd", &["if=/dev/zero", &of, "bs=1M", &count, "status=none"])
            .await
    }
}

#[async_trait::async_trait]
impl SetupStep for SwapStep {
    fn name(&self) -> &str {
        "swap"
    }

    fn is_requested(&self, plan: &SetupPlan) -> bool {
        plan.swap_size_mb.is_some()
    }

    async fn apply(
        &self,
        ctx: &StepContext<'_>,
        exec: &mut dyn CommandExecutor,
    ) -> Result<StepOutcome> {
        let Some(size_mb) = ctx.plan.swap_size_mb else {
            return Ok(StepOutcome::Skipped("no swap requested".to_string()));
        };
        if size_mb == 0 {
            return Ok(StepOutcome::Failed(SetupError::validation(
                "swap size must be greater than 0 MB",
            )));
        }
        if size_mb > MAX_SWAP_SIZE_MB {
            return Ok(StepOutcome::Failed(SetupError::validation(format!(
                "swap size {} MB exceeds the {} MB limit",
                size_mb, MAX_SWAP_SIZE_MB
            ))));
        }

        let swap_file = &ctx.config.paths.swap_file;
        let dir = swap_file.parent().unwrap_or_else(|| Path::new("/"));
        let dir = if dir.as_os_str().is_empty() { Path::new(".") } else { dir };

        let available = SystemUtils::available_space_mb(exec, dir)
            .await?
            .saturating_add(Self::reclaimable_mb(swap_file).await);
        let required = size_mb.saturating_add(SWAP_HEADROOM_MB);
        if available < required {
            return Ok(StepOutcome::Failed(SetupError::resource(format!(
                "not enough disk space for a {} MB swap file: {} MB available, {} MB required ({} MB headroom)",
                size_mb, available, required, SWAP_HEADROOM_MB
            ))));
        }

        Self::remove_existing(exec, swap_file, &ctx.config.paths.swaps).await?;

        let path = swap_file.display().to_string();
        Self::allocate(exec, &path, size_mb).await?;
        exec.execute("chmod", &["600", &path]).await?;
        exec.execute("mkswap", &[&path]).await?;
        exec.execute("swapon", &[&path]).await?;

        let fstab_path = &ctx.config.paths.fstab;
        let fstab = read_or_empty(fstab_path).await?;
        match files::ensure_fstab_swap_entry(&fstab, &path) {
            Some(updated) => {
                tokio::fs::write(fstab_path, updated).await?;
                info!("Added {} to {}", path, fstab_path.display());
            }
            None => debug!("{} already lists {}", fstab_path.display(), path),
        }

        Ok(StepOutcome::Applied(format!(
            "{} MB swap file active at {}",
            size_mb, path
        )))
    }

    async fn verify(
        &self,
        ctx: &StepContext<'_>,
        _exec: &mut dyn CommandExecutor,
    ) -> Result<Vec<CheckResult>> {
        let Some(size_mb) = ctx.plan.swap_size_mb else {
            return Ok(Vec::new());
        };

        let check = match SystemUtils::swap_total_kb(&ctx.config.paths.meminfo).await {
            Ok(total_kb)
                if total_kb.saturating_add(SWAP_TOLERANCE_KB) >= size_mb.saturating_mul(1024) =>
            {
                CheckResult::pass(
                    "swap",
                    format!("{} MB of swap active", total_kb / 1024),
                )
            }
            Ok(total_kb) => CheckResult::fail(
                "swap",
                format!(
                    "only {} MB of swap active, expected at least {} MB",
                    total_kb / 1024,
                    size_mb
                ),
            ),
            Err(e) => CheckResult::fail("swap", format!("could not read swap total: {}", e)),
        };
        Ok(vec![check])
    }
}
