// file: src/executor/fake.rs
// version: 1.1.0
// guid: 9f0d2c4e-1b83-4a6f-a7d5-c2e8b0f4169d

//! Simulated host for unit tests
//!
//! Tracks the small amount of live state the steps query back (hostname,
//! active swap, installed packages, running services) and records every call.

use super::{CommandExecutor, CommandOutput};
use crate::error::Result;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Call {
    pub program: String,
    pub args: Vec<String>,
    pub input: Option<String>,
}

impl Call {
    pub fn line(&self) -> String {
        super::command_line(
            &self.program,
            &self.args.iter().map(String::as_str).collect::<Vec<_>>(),
        )
    }
}

pub struct FakeHost {
    pub calls: Vec<Call>,
    pub hostname: String,
    pub available_mb: u64,
    pub fallocate_supported: bool,
    pub sshd_config_valid: bool,
    pub installed: HashSet<String>,
    pub active_services: HashSet<String>,
    pub active_swap: Vec<String>,
    pub passwords: HashMap<String, String>,
    pub meminfo: PathBuf,
    /// /proc/swaps stand-in, kept next to `meminfo`
    pub swaps: PathBuf,
    /// swapoff fails even for an active file, as under memory pressure
    pub swapoff_fails: bool,
    pending_swap_mb: HashMap<String, u64>,
    swap_total_kb: u64,
}

impl FakeHost {
    pub fn new(meminfo: PathBuf) -> Self {
        let host = Self {
            calls: Vec::new(),
            hostname: "localhost".to_string(),
            available_mb: 20_000,
            fallocate_supported: true,
            sshd_config_valid: true,
            installed: HashSet::new(),
            active_services: HashSet::new(),
            active_swap: Vec::new(),
            passwords: HashMap::new(),
            swaps: meminfo.with_file_name("swaps"),
            swapoff_fails: false,
            meminfo,
            pending_swap_mb: HashMap::new(),
            swap_total_kb: 0,
        };
        host.write_meminfo();
        host
    }

    pub fn called(&self, program: &str) -> bool {
        self.calls.iter().any(|c| c.program == program)
    }

    pub fn lines(&self) -> Vec<String> {
        self.calls.iter().map(Call::line).collect()
    }

    fn write_meminfo(&self) {
        let content = format!(
            "MemTotal:        2014512 kB\nMemFree:          811232 kB\nSwapTotal:       {} kB\nSwapFree:        {} kB\n",
            self.swap_total_kb, self.swap_total_kb
        );
        let _ = fs::write(&self.meminfo, content);

        let mut swaps = String::from("Filename\t\t\t\tType\t\tSize\t\tUsed\t\tPriority\n");
        for path in &self.active_swap {
            let kb = self.pending_swap_mb.get(path).copied().unwrap_or(0) * 1024;
            swaps.push_str(&format!("{}\tfile\t\t{}\t\t0\t\t-2\n", path, kb.saturating_sub(4)));
        }
        let _ = fs::write(&self.swaps, swaps);
    }

    fn create_swap_file(&mut self, path: &str, size_mb: u64) -> CommandOutput {
        match fs::write(path, b"") {
            Ok(()) => {
                self.pending_swap_mb.insert(path.to_string(), size_mb);
                CommandOutput::ok("")
            }
            Err(e) => CommandOutput::failed(1, e.to_string()),
        }
    }

    fn respond(&mut self, program: &str, args: &[&str], input: Option<&str>) -> CommandOutput {
        match (program, args) {
            ("hostnamectl", ["set-hostname", name]) => {
                self.hostname = name.to_string();
                CommandOutput::ok("")
            }
            ("hostname", []) => CommandOutput::ok(format!("{}\n", self.hostname)),
            ("df", ["-Pm", dir]) => CommandOutput::ok(format!(
                "Filesystem     1048576-blocks  Used Available Capacity Mounted on\n/dev/vda1               40000  1000 {:>9}       3% {}\n",
                self.available_mb, dir
            )),
            ("fallocate", ["-l", size, path]) => {
                if !self.fallocate_supported {
                    return CommandOutput::failed(1, "fallocate: fallocate failed: Operation not supported");
                }
                let mb = size.trim_end_matches('M').parse().unwrap_or(0);
                self.create_swap_file(path, mb)
            }
            ("dd", [_, of, _, count, _]) => {
                let path = of.trim_start_matches("of=");
                let mb = count.trim_start_matches("count=").parse().unwrap_or(0);
                self.create_swap_file(path, mb)
            }
            ("chmod", ["600", _]) | ("mkswap", [_]) => CommandOutput::ok(""),
            ("swapon", [path]) => {
                let mb = self.pending_swap_mb.get(*path).copied().unwrap_or(0);
                self.active_swap.push(path.to_string());
                self.swap_total_kb += (mb * 1024).saturating_sub(4);
                self.write_meminfo();
                CommandOutput::ok("")
            }
            ("swapoff", [path]) if self.swapoff_fails && self.active_swap.iter().any(|p| p == path) => {
                CommandOutput::failed(255, format!("swapoff: {}: swapoff failed: Cannot allocate memory", path))
            }
            ("swapoff", [path]) => {
                if let Some(pos) = self.active_swap.iter().position(|p| p == path) {
                    self.active_swap.remove(pos);
                    let mb = self.pending_swap_mb.get(*path).copied().unwrap_or(0);
                    self.swap_total_kb = self.swap_total_kb.saturating_sub((mb * 1024).saturating_sub(4));
                    self.write_meminfo();
                    CommandOutput::ok("")
                } else {
                    CommandOutput::failed(255, format!("swapoff: {}: swapoff failed: Invalid argument", path))
                }
            }
            ("dpkg", ["-s", package]) => {
                if self.installed.contains(*package) {
                    CommandOutput::ok(format!("Package: {}\nStatus: install ok installed\n", package))
                } else {
                    CommandOutput::failed(1, format!("dpkg-query: package '{}' is not installed", package))
                }
            }
            ("apt-get", ["update"]) => CommandOutput::ok(""),
            ("apt-get", ["install", "-y", package]) => {
                self.installed.insert(package.to_string());
                CommandOutput::ok("")
            }
            ("chpasswd", []) => {
                let line = input.unwrap_or_default().trim_end();
                match line.split_once(':') {
                    Some((user, password)) => {
                        self.passwords.insert(user.to_string(), password.to_string());
                        CommandOutput::ok("")
                    }
                    None => CommandOutput::failed(1, "chpasswd: line 1: missing new password"),
                }
            }
            ("passwd", ["-S", user]) => {
                let status = if self.passwords.contains_key(*user) { "P" } else { "L" };
                CommandOutput::ok(format!("{} {} 10/16/2026 0 99999 7 -1\n", user, status))
            }
            ("sshd", ["-t", "-f", _]) => {
                if self.sshd_config_valid {
                    CommandOutput::ok("")
                } else {
                    CommandOutput::failed(255, "/etc/ssh/sshd_config line 42: Badly formatted port number.")
                }
            }
            ("systemctl", ["enable", service]) | ("systemctl", ["restart", service]) => {
                self.active_services.insert(service.to_string());
                CommandOutput::ok("")
            }
            ("systemctl", ["is-active", service]) => {
                if self.active_services.contains(*service) {
                    CommandOutput::ok("active\n")
                } else {
                    CommandOutput {
                        status: Some(3),
                        stdout: "inactive\n".to_string(),
                        stderr: String::new(),
                    }
                }
            }
            _ => CommandOutput::failed(127, format!("{}: command not found", program)),
        }
    }
}

#[async_trait::async_trait]
impl CommandExecutor for FakeHost {
    async fn run_raw(
        &mut self,
        program: &str,
        args: &[&str],
        input: Option<&str>,
    ) -> Result<CommandOutput> {
        self.calls.push(Call {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            input: input.map(str::to_string),
        });
        Ok(self.respond(program, args, input))
    }
}
