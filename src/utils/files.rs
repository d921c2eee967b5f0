// file: src/utils/files.rs
// version: 1.0.0
// guid: 6e4b2d8a-0f17-4c93-b5a2-d81c7e3f9046

//! Text transforms for the configuration files the steps edit
//!
//! Each function takes the current file content and returns the new content,
//! so the steps stay a thin read-transform-write shell around them.

use std::path::{Path, PathBuf};

/// Address Debian-family systems map to the machine's own hostname
pub const LOOPBACK_ALIAS_ADDR: &str = "127.0.1.1";

fn join_lines(lines: Vec<String>) -> String {
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Point every `127.0.1.1` line at `hostname`, appending one if none exists
pub fn set_loopback_alias(hosts: &str, hostname: &str) -> String {
    let alias = format!("{}\t{}", LOOPBACK_ALIAS_ADDR, hostname);
    let mut found = false;
    let mut lines: Vec<String> = hosts
        .lines()
        .map(|line| {
            if line.split_whitespace().next() == Some(LOOPBACK_ALIAS_ADDR) {
                found = true;
                alias.clone()
            } else {
                line.to_string()
            }
        })
        .collect();

    if !found {
        lines.push(alias);
    }
    join_lines(lines)
}

/// Append a swap entry for `swap_file` unless a line already mentions it
///
/// Returns `None` when the table already has an entry.
pub fn ensure_fstab_swap_entry(fstab: &str, swap_file: &str) -> Option<String> {
    if fstab.lines().any(|line| line.contains(swap_file)) {
        return None;
    }
    let mut lines: Vec<String> = fstab.lines().map(str::to_string).collect();
    lines.push(format!("{} none swap sw 0 0", swap_file));
    Some(join_lines(lines))
}

fn is_port_directive(line: &str) -> bool {
    line.split_whitespace()
        .next()
        .map(|keyword| keyword.eq_ignore_ascii_case("port"))
        .unwrap_or(false)
}

/// Drop active `Port` directives and append `Port <port>`
///
/// Commented lines such as `#Port 22` are left alone.
pub fn replace_port_directive(sshd_config: &str, port: u16) -> String {
    let mut lines: Vec<String> = sshd_config
        .lines()
        .filter(|line| !is_port_directive(line))
        .map(str::to_string)
        .collect();
    lines.push(format!("Port {}", port));
    join_lines(lines)
}

/// Port of the last active `Port` directive, if any
pub fn last_port_directive(sshd_config: &str) -> Option<u16> {
    sshd_config
        .lines()
        .filter(|line| is_port_directive(line))
        .filter_map(|line| line.split_whitespace().nth(1)?.parse().ok())
        .last()
}

/// Backup location for `config` stamped with `timestamp`
pub fn backup_path(config: &Path, timestamp: i64) -> PathBuf {
    let mut name = config.as_os_str().to_os_string();
    name.push(format!(".bak.{}", timestamp));
    PathBuf::from(name)
}

/// Render the sshd jail for fail2ban
pub fn render_sshd_jail(policy: &crate::config::Fail2banPolicy, ports: &[u16]) -> String {
    let ports = ports
        .iter()
        .map(u16::to_string)
        .collect::<Vec<_>>()
        .join(",");
    format!(
        "# Managed by vps-bootstrap\n\
         [sshd]\n\
         enabled = true\n\
         port = {ports}\n\
         filter = sshd\n\
         backend = {backend}\n\
         logpath = {logpath}\n\
         maxretry = {maxretry}\n\
         findtime = {findtime}\n\
         bantime = {bantime}\n",
        ports = ports,
        backend = policy.backend,
        logpath = policy.logpath,
        maxretry = policy.maxretry,
        findtime = policy.findtime_secs,
        bantime = policy.bantime,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Fail2banPolicy;

    const UBUNTU_HOSTS: &str = "127.0.0.1 localhost\n127.0.1.1 ubuntu-s-1vcpu\n\n::1 ip6-localhost ip6-loopback\n";

    #[test]
    fn test_set_loopback_alias_rewrites_existing_line() {
        let updated = set_loopback_alias(UBUNTU_HOSTS, "web01");
        assert_eq!(
            updated,
            "127.0.0.1 localhost\n127.0.1.1\tweb01\n\n::1 ip6-localhost ip6-loopback\n"
        );
    }

    #[test]
    fn test_set_loopback_alias_appends_when_missing() {
        let updated = set_loopback_alias("127.0.0.1 localhost\n", "web01");
        assert_eq!(updated, "127.0.0.1 localhost\n127.0.1.1\tweb01\n");
    }

    #[test]
    fn test_set_loopback_alias_is_idempotent() {
        let once = set_loopback_alias(UBUNTU_HOSTS, "web01");
        let twice = set_loopback_alias(&once, "web01");
        assert_eq!(once, twice);
    }

    #[test]
    fn test_set_loopback_alias_ignores_lookalike_addresses() {
        let hosts = "127.0.1.10 other\n";
        let updated = set_loopback_alias(hosts, "web01");
        assert!(updated.contains("127.0.1.10 other"));
        assert!(updated.contains("127.0.1.1\tweb01"));
    }

    #[test]
    fn test_fstab_entry_appended_once() {
        let fstab = "UUID=abcd / ext4 defaults 0 1\n";
        let updated = ensure_fstab_swap_entry(fstab, "/swapfile").unwrap();
        assert_eq!(
            updated,
            "UUID=abcd / ext4 defaults 0 1\n/swapfile none swap sw 0 0\n"
        );
        assert!(ensure_fstab_swap_entry(&updated, "/swapfile").is_none());
    }

    #[test]
    fn test_fstab_entry_on_empty_table() {
        assert_eq!(
            ensure_fstab_swap_entry("", "/swapfile").unwrap(),
            "/swapfile none swap sw 0 0\n"
        );
    }

    #[test]
    fn test_replace_port_directive() {
        let config = "#Port 22\nPort 22\nPermitRootLogin yes\nport 2200\n";
        let updated = replace_port_directive(config, 2222);
        assert_eq!(updated, "#Port 22\nPermitRootLogin yes\nPort 2222\n");
        assert_eq!(last_port_directive(&updated), Some(2222));
    }

    #[test]
    fn test_last_port_directive() {
        assert_eq!(last_port_directive("#Port 22\n"), None);
        assert_eq!(last_port_directive("Port 22\nPort 2022\n"), Some(2022));
        assert_eq!(last_port_directive("  Port 2200\n"), Some(2200));
        assert_eq!(last_port_directive("Ports 1\n"), None);
    }

    #[test]
    fn test_backup_path() {
        let path = backup_path(Path::new("/etc/ssh/sshd_config"), 1760600000);
        assert_eq!(path, PathBuf::from("/etc/ssh/sshd_config.bak.1760600000"));
    }

    #[test]
    fn test_render_sshd_jail() {
        let jail = render_sshd_jail(&Fail2banPolicy::default(), &[22, 2222]);
        assert!(jail.contains("[sshd]\n"));
        assert!(jail.contains("enabled = true\n"));
        assert!(jail.contains("port = 22,2222\n"));
        assert!(jail.contains("maxretry = 3\n"));
        assert!(jail.contains("findtime = 300\n"));
        assert!(jail.contains("bantime = -1\n"));
    }
}
