// file: src/steps/mod.rs
// version: 2.0.0
// guid: h8i9j0k1-l2m3-4567-8901-bcdef234567

//! Setup steps: independent "ensure desired state" operations
//!
//! Each step applies one group of settings from the [`SetupPlan`] and can
//! re-query the host afterwards to verify it. Steps run in the order returned
//! by [`default_steps`] and never depend on each other's outcome.

pub mod fail2ban;
pub mod hostname;
pub mod packages;
pub mod ssh;
pub mod swap;

pub use fail2ban::Fail2banStep;
pub use hostname::HostnameStep;
pub use ssh::SshStep;
pub use swap::SwapStep;

use crate::config::{BootstrapConfig, SetupPlan};
use crate::error::{Result, SetupError};
use crate::executor::CommandExecutor;
use crate::verify::CheckResult;

/// Context passed to each setup step
#[derive(Debug, Clone, Copy)]
pub struct StepContext<'a> {
    /// Paths, service names and policy
    pub config: &'a BootstrapConfig,

    /// Validated answers from the collector
    pub plan: &'a SetupPlan,
}

/// Result of applying one step
///
/// Fatal failures are not represented here: they travel as `Err` and end the run.
#[derive(Debug)]
pub enum StepOutcome {
    /// Desired state reached
    Applied(String),

    /// Nothing requested for this step
    Skipped(String),

    /// Validation, resource or recovered failure; the run continues
    Failed(SetupError),
}

impl StepOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, StepOutcome::Applied(_))
    }
}

/// Trait for setup steps
#[async_trait::async_trait]
pub trait SetupStep: Send + Sync {
    /// Get the name of this step
    fn name(&self) -> &str;

    /// Whether the plan asks for anything this step does
    fn is_requested(&self, plan: &SetupPlan) -> bool;

    /// Bring the host to the requested state
    async fn apply(
        &self,
        ctx: &StepContext<'_>,
        exec: &mut dyn CommandExecutor,
    ) -> Result<StepOutcome>;

    /// Re-query live state for every setting this step applied
    async fn verify(
        &self,
        ctx: &StepContext<'_>,
        exec: &mut dyn CommandExecutor,
    ) -> Result<Vec<CheckResult>>;
}

/// Steps in execution order
pub fn default_steps() -> Vec<Box<dyn SetupStep>> {
    vec![
        Box::new(HostnameStep),
        Box::new(SwapStep),
        Box::new(SshStep),
        Box::new(Fail2banStep),
    ]
}
