// file: src/utils/system.rs
// version: 2.1.0
// guid: w3x4y5z6-a7b8-9012-3456-789012wxyzab

//! System introspection helpers

use crate::error::{Result, SetupError};
use crate::executor::CommandExecutor;
use std::path::Path;
use tracing::{debug, warn};

/// Programs the bootstrap steps may invoke
pub const REQUIRED_TOOLS: &[&str] = &[
    "hostnamectl",
    "hostname",
    "df",
    "fallocate",
    "dd",
    "chmod",
    "mkswap",
    "swapon",
    "swapoff",
    "dpkg",
    "apt-get",
    "chpasswd",
    "passwd",
    "systemctl",
];

/// System utility functions
pub struct SystemUtils;

impl SystemUtils {
    /// Check if running as root
    pub fn is_root() -> bool {
        // SAFETY: geteuid has no preconditions and cannot fail
        unsafe { libc::geteuid() == 0 }
    }

    /// Fail with a permission error unless running as root
    pub fn require_root() -> Result<()> {
        if Self::is_root() {
            Ok(())
        } else {
            Err(SetupError::permission(
                "this tool changes system configuration and must be run as root (try sudo)",
            ))
        }
    }

    /// Tools from `tools` that are not found in PATH
    pub fn missing_tools(tools: &[&str]) -> Vec<String> {
        let missing: Vec<String> = tools
            .iter()
            .filter(|tool| which::which(tool).is_err())
            .map(|tool| tool.to_string())
            .collect();
        if !missing.is_empty() {
            warn!("Missing tools in PATH: {}", missing.join(", "));
        }
        missing
    }

    /// Free space in MB on the filesystem holding `dir`
    pub async fn available_space_mb<E>(exec: &mut E, dir: &Path) -> Result<u64>
    where
        E: CommandExecutor + ?Sized,
    {
        let dir = dir.display().to_string();
        let output = exec.execute_with_output("df", &["-Pm", &dir]).await?;
        let available = Self::parse_df_available_mb(&output)?;
        debug!("{} MB available on filesystem of {}", available, dir);
        Ok(available)
    }

    /// Parse the "Available" column of POSIX `df -Pm` output
    pub fn parse_df_available_mb(output: &str) -> Result<u64> {
        let line = output
            .lines()
            .skip(1)
            .find(|l| !l.trim().is_empty())
            .ok_or_else(|| SetupError::system("Unexpected df output format"))?;

        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 6 {
            return Err(SetupError::system(format!("Unexpected df field count: {}", line)));
        }

        fields[3]
            .parse::<u64>()
            .map_err(|_| SetupError::system(format!("Failed to parse available disk space: {}", fields[3])))
    }

    /// Read `SwapTotal` in kB from a meminfo file
    pub async fn swap_total_kb(meminfo: &Path) -> Result<u64> {
        let content = tokio::fs::read_to_string(meminfo).await?;
        Self::parse_swap_total_kb(&content).ok_or_else(|| {
            SetupError::system(format!("SwapTotal not found in {}", meminfo.display()))
        })
    }

    /// True when `swap_file` is listed as an active swap area
    pub async fn is_swap_active(swaps: &Path, swap_file: &Path) -> Result<bool> {
        match tokio::fs::read_to_string(swaps).await {
            Ok(content) => Ok(Self::parse_active_swaps(&content)
                .iter()
                .any(|active| Path::new(active) == swap_file)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Filenames listed in /proc/swaps
    pub fn parse_active_swaps(content: &str) -> Vec<String> {
        content
            .lines()
            .skip(1)
            .filter_map(|line| line.split_whitespace().next())
            .map(str::to_string)
            .collect()
    }

    /// Parse the `SwapTotal:` line of /proc/meminfo
    pub fn parse_swap_total_kb(content: &str) -> Option<u64> {
        content.lines().find_map(|line| {
            let rest = line.strip_prefix("SwapTotal:")?;
            rest.split_whitespace().next()?.parse().ok()
        })
    }
}
