// file: src/steps/packages.rs
// version: 2.0.0
// guid: sshpkg01-2345-6789-abcd-ef0123456789

//! Package management for setup steps

use crate::error::Result;
use crate::executor::CommandExecutor;
use crate::ui::Spinner;
use tracing::info;

/// Whether dpkg reports `package` as fully installed
pub async fn is_installed(exec: &mut dyn CommandExecutor, package: &str) -> Result<bool> {
    let output = exec.run_raw("dpkg", &["-s", package], None).await?;
    Ok(output.success() && output.stdout.contains("install ok installed"))
}

/// Install `package` with apt-get unless it is already present
pub async fn ensure_installed(exec: &mut dyn CommandExecutor, package: &str) -> Result<()> {
    if is_installed(exec, package).await? {
        info!("Package {} already installed", package);
        return Ok(());
    }

    info!("Installing package {}", package);
    let spinner = Spinner::start(format!("Installing {}...", package));
    exec.execute("apt-get", &["update"]).await?;
    exec.execute("apt-get", &["install", "-y", package]).await?;
    spinner.finish(&format!("{} installed", package));

    Ok(())
}
