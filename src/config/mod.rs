// file: src/config/mod.rs
// version: 2.1.0
// guid: 7d2e4b91-3c5a-4f08-b6e2-91a0c4d8f357

//! Configuration module for the VPS bootstrap tool
//!
//! [`BootstrapConfig`] holds every file location, service name and fail2ban
//! policy value the steps touch. Defaults match a stock Ubuntu host and can be
//! overridden from a YAML file through [`loader::ConfigLoader`]. The
//! administrator's answers live separately in [`SetupPlan`].

pub mod loader;
pub mod plan;

pub use plan::{Secret, SetupPlan};

use crate::error::{Result, SetupError};
use serde::Deserialize;
use std::path::PathBuf;

/// Top-level tool configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BootstrapConfig {
    pub paths: SystemPaths,
    pub services: ServiceNames,
    pub fail2ban: Fail2banPolicy,
    /// Account whose password the SSH step changes
    pub password_user: PasswordUser,
}

/// Files read or written on the host
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SystemPaths {
    pub hosts_file: PathBuf,
    pub fstab: PathBuf,
    pub swap_file: PathBuf,
    pub sshd_config: PathBuf,
    pub sshd_privsep_dir: PathBuf,
    pub fail2ban_jail: PathBuf,
    pub meminfo: PathBuf,
    /// Active swap areas, one per line after the header
    pub swaps: PathBuf,
    pub log_file: PathBuf,
}

impl Default for SystemPaths {
    fn default() -> Self {
        Self {
            hosts_file: PathBuf::from("/etc/hosts"),
            fstab: PathBuf::from("/etc/fstab"),
            swap_file: PathBuf::from("/swapfile"),
            sshd_config: PathBuf::from("/etc/ssh/sshd_config"),
            sshd_privsep_dir: PathBuf::from("/run/sshd"),
            fail2ban_jail: PathBuf::from("/etc/fail2ban/jail.local"),
            meminfo: PathBuf::from("/proc/meminfo"),
            swaps: PathBuf::from("/proc/swaps"),
            log_file: PathBuf::from("/var/log/vps-bootstrap.log"),
        }
    }
}

/// systemd units and packages managed by the steps
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceNames {
    pub ssh_service: String,
    pub ssh_package: String,
    pub fail2ban_service: String,
    pub fail2ban_package: String,
}

impl Default for ServiceNames {
    fn default() -> Self {
        Self {
            ssh_service: "ssh".to_string(),
            ssh_package: "openssh-server".to_string(),
            fail2ban_service: "fail2ban".to_string(),
            fail2ban_package: "fail2ban".to_string(),
        }
    }
}

/// Password target account, `root` unless configured
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct PasswordUser(pub String);

impl Default for PasswordUser {
    fn default() -> Self {
        Self("root".to_string())
    }
}

impl PasswordUser {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Values written into the sshd jail
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Fail2banPolicy {
    /// Ban duration in seconds, `-1` bans permanently
    pub bantime: i64,
    pub findtime_secs: u64,
    pub maxretry: u32,
    pub backend: String,
    pub logpath: String,
    /// Keep port 22 in the jail even after SSH moved elsewhere
    pub protect_default_port: bool,
}

impl Default for Fail2banPolicy {
    fn default() -> Self {
        Self {
            bantime: -1,
            findtime_secs: 300,
            maxretry: 3,
            backend: "auto".to_string(),
            logpath: "/var/log/auth.log".to_string(),
            protect_default_port: true,
        }
    }
}

/// Default SSH port fail2ban watches when nothing else is configured
pub const DEFAULT_SSH_PORT: u16 = 22;

impl Fail2banPolicy {
    /// Ports the sshd jail protects, given the newly configured SSH port
    pub fn protected_ports(&self, ssh_port: Option<u16>) -> Vec<u16> {
        let mut ports = Vec::new();
        if self.protect_default_port || ssh_port.is_none() {
            ports.push(DEFAULT_SSH_PORT);
        }
        if let Some(port) = ssh_port {
            if !ports.contains(&port) {
                ports.push(port);
            }
        }
        ports
    }
}

impl BootstrapConfig {
    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let paths = [
            ("hosts_file", &self.paths.hosts_file),
            ("fstab", &self.paths.fstab),
            ("swap_file", &self.paths.swap_file),
            ("sshd_config", &self.paths.sshd_config),
            ("sshd_privsep_dir", &self.paths.sshd_privsep_dir),
            ("fail2ban_jail", &self.paths.fail2ban_jail),
            ("meminfo", &self.paths.meminfo),
            ("swaps", &self.paths.swaps),
            ("log_file", &self.paths.log_file),
        ];
        for (name, path) in paths {
            if path.as_os_str().is_empty() {
                return Err(SetupError::config(format!("paths.{} must not be empty", name)));
            }
        }

        let services = [
            ("ssh_service", &self.services.ssh_service),
            ("ssh_package", &self.services.ssh_package),
            ("fail2ban_service", &self.services.fail2ban_service),
            ("fail2ban_package", &self.services.fail2ban_package),
        ];
        for (name, value) in services {
            if value.trim().is_empty() {
                return Err(SetupError::config(format!("services.{} must not be empty", name)));
            }
        }

        if self.password_user.as_str().trim().is_empty() {
            return Err(SetupError::config("password_user must not be empty"));
        }

        if self.fail2ban.maxretry == 0 {
            return Err(SetupError::config("fail2ban.maxretry must be at least 1"));
        }
        if self.fail2ban.findtime_secs == 0 {
            return Err(SetupError::config("fail2ban.findtime_secs must be at least 1"));
        }
        if self.fail2ban.bantime == 0 || self.fail2ban.bantime < -1 {
            return Err(SetupError::config(
                "fail2ban.bantime must be positive or -1 for a permanent ban",
            ));
        }

        Ok(())
    }
}
