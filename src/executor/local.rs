// file: src/executor/local.rs
// version: 2.0.0
// guid: 1a6c0e2b-7d94-4f35-b8a1-5e2c9d0f7b63

//! Local command execution on the machine being bootstrapped

use super::{command_line, CommandExecutor, CommandOutput};
use crate::error::{Result, SetupError};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, error};

/// Runs programs directly (argv, no shell) and logs their output
pub struct LocalExecutor;

impl LocalExecutor {
    /// Create a new local executor
    pub fn new() -> Self {
        Self
    }
}

impl Default for LocalExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl CommandExecutor for LocalExecutor {
    async fn run_raw(
        &mut self,
        program: &str,
        args: &[&str],
        input: Option<&str>,
    ) -> Result<CommandOutput> {
        let line = command_line(program, args);
        match input {
            Some(data) => debug!("Executing: {} (stdin: {} bytes redacted)", line, data.len()),
            None => debug!("Executing: {}", line),
        }

        let mut child = Command::new(program)
            .args(args)
            .env("DEBIAN_FRONTEND", "noninteractive")
            .stdin(if input.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| SetupError::Process {
                command: line.clone(),
                exit_code: None,
                stderr: format!("Failed to execute command: {}", e),
            })?;

        if let (Some(data), Some(mut stdin)) = (input, child.stdin.take()) {
            stdin.write_all(data.as_bytes()).await?;
            stdin.shutdown().await?;
        }

        let output = child.wait_with_output().await?;
        let result = CommandOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        };

        if result.success() {
            if !result.stdout.trim().is_empty() {
                debug!("STDOUT: {}", result.stdout.trim_end());
            }
        } else {
            error!("Command '{}' failed with exit code {:?}", line, result.status);
            if !result.stdout.trim().is_empty() {
                error!("STDOUT: {}", result.stdout.trim_end());
            }
            if !result.stderr.trim().is_empty() {
                error!("STDERR: {}", result.stderr.trim_end());
            }
        }

        Ok(result)
    }
}
