// file: src/config/plan.rs
// version: 1.1.0
// guid: c3a91e5f-6b27-4d8c-9f14-0e7b2a6d5c81

//! The administrator's requested changes and their input validators

use crate::error::{Result, SetupError};
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// Longest hostname label accepted by `hostnamectl`
pub const MAX_HOSTNAME_LEN: usize = 63;

/// Largest swap file accepted, 1 TiB
pub const MAX_SWAP_SIZE_MB: u64 = 1024 * 1024;

/// Requested changes; `None` means leave the setting alone
#[derive(Debug, Clone, Default)]
pub struct SetupPlan {
    pub hostname: Option<String>,
    pub swap_size_mb: Option<u64>,
    pub ssh_port: Option<u16>,
    pub ssh_password: Option<Secret>,
    pub fail2ban_enabled: bool,
}

impl SetupPlan {
    /// True when nothing was selected
    pub fn is_empty(&self) -> bool {
        self.hostname.is_none()
            && self.swap_size_mb.is_none()
            && self.ssh_port.is_none()
            && self.ssh_password.is_none()
            && !self.fail2ban_enabled
    }

    /// Human-readable lines describing the plan, passwords redacted
    pub fn describe(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(hostname) = &self.hostname {
            lines.push(format!("Hostname: {}", hostname));
        }
        if let Some(size) = self.swap_size_mb {
            lines.push(format!("Swap file: {} MB", size));
        }
        if let Some(port) = self.ssh_port {
            lines.push(format!("SSH port: {}", port));
        }
        if self.ssh_password.is_some() {
            lines.push("SSH password: will be changed".to_string());
        }
        if self.fail2ban_enabled {
            lines.push("Fail2ban: enable sshd jail".to_string());
        }
        lines
    }
}

/// A password that never prints itself
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(****)")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("****")
    }
}

fn hostname_regex() -> &'static Regex {
    static HOSTNAME_RE: OnceLock<Regex> = OnceLock::new();
    HOSTNAME_RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9]([A-Za-z0-9-]*[A-Za-z0-9])?$").expect("hostname pattern is valid")
    })
}

/// Validate a single-label hostname
pub fn validate_hostname(hostname: &str) -> Result<()> {
    if hostname.len() > MAX_HOSTNAME_LEN {
        return Err(SetupError::validation(format!(
            "hostname '{}' is longer than {} characters",
            hostname, MAX_HOSTNAME_LEN
        )));
    }
    if !hostname_regex().is_match(hostname) {
        return Err(SetupError::validation(format!(
            "hostname '{}' must contain only letters, digits and hyphens, and must not start or end with a hyphen",
            hostname
        )));
    }
    Ok(())
}

/// Parse a swap size in megabytes
pub fn parse_swap_size(input: &str) -> Result<u64> {
    let trimmed = input.trim();
    let size = trimmed.parse::<u64>().map_err(|_| {
        SetupError::validation(format!("swap size '{}' is not a whole number of MB", trimmed))
    })?;
    if size == 0 {
        return Err(SetupError::validation("swap size must be greater than 0 MB"));
    }
    if size > MAX_SWAP_SIZE_MB {
        return Err(SetupError::validation(format!(
            "swap size {} MB exceeds the {} MB limit",
            size, MAX_SWAP_SIZE_MB
        )));
    }
    Ok(size)
}

/// Parse an SSH port in the range 1-65535
pub fn parse_ssh_port(input: &str) -> Result<u16> {
    let trimmed = input.trim();
    let port = trimmed
        .parse::<u32>()
        .map_err(|_| SetupError::validation(format!("SSH port '{}' is not a number", trimmed)))?;
    if !(1..=65535).contains(&port) {
        return Err(SetupError::validation(format!(
            "SSH port {} is outside the range 1-65535",
            port
        )));
    }
    Ok(port as u16)
}
