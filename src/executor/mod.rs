// file: src/executor/mod.rs
// version: 2.1.0
// guid: e8b3f1a0-5c2d-4a79-8e16-3b0d9c7f2a54

//! Command execution seam between the setup steps and the host

pub mod local;

#[cfg(test)]
pub(crate) mod fake;

pub use local::LocalExecutor;

use crate::error::{Result, SetupError};

/// Captured result of one external command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` when the process was killed by a signal
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Successful output with the given stdout
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            status: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Failed output with the given exit code and stderr
    pub fn failed(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            status: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn success(&self) -> bool {
        self.status == Some(0)
    }

    /// Best available failure text: stderr, else stdout
    pub fn diagnostic(&self) -> &str {
        if self.stderr.trim().is_empty() {
            self.stdout.trim()
        } else {
            self.stderr.trim()
        }
    }
}

/// Render a program and its arguments as a single log-friendly line
pub fn command_line(program: &str, args: &[&str]) -> String {
    if args.is_empty() {
        program.to_string()
    } else {
        format!("{} {}", program, args.join(" "))
    }
}

/// Trait for executing commands on the host being bootstrapped
///
/// Only [`CommandExecutor::run_raw`] must be implemented. It reports non-zero
/// exits as data. The provided methods turn them into
/// [`SetupError::Process`], which ends the run.
#[async_trait::async_trait]
pub trait CommandExecutor: Send {
    /// Run a program to completion, optionally feeding `input` on stdin
    async fn run_raw(
        &mut self,
        program: &str,
        args: &[&str],
        input: Option<&str>,
    ) -> Result<CommandOutput>;

    /// Execute command, failing on non-zero exit
    async fn execute(&mut self, program: &str, args: &[&str]) -> Result<()> {
        let output = self.run_raw(program, args, None).await?;
        ensure_success(program, args, &output)
    }

    /// Execute command and return its stdout
    async fn execute_with_output(&mut self, program: &str, args: &[&str]) -> Result<String> {
        let output = self.run_raw(program, args, None).await?;
        ensure_success(program, args, &output)?;
        Ok(output.stdout)
    }

    /// Execute command with `input` piped to stdin, failing on non-zero exit
    async fn execute_with_input(&mut self, program: &str, args: &[&str], input: &str) -> Result<()> {
        let output = self.run_raw(program, args, Some(input)).await?;
        ensure_success(program, args, &output)
    }
}

fn ensure_success(program: &str, args: &[&str], output: &CommandOutput) -> Result<()> {
    if output.success() {
        return Ok(());
    }
    Err(SetupError::Process {
        command: command_line(program, args),
        exit_code: output.status,
        stderr: output.diagnostic().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Canned(CommandOutput);

    #[async_trait::async_trait]
    impl CommandExecutor for Canned {
        async fn run_raw(
            &mut self,
            _program: &str,
            _args: &[&str],
            _input: Option<&str>,
        ) -> Result<CommandOutput> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn test_execute_maps_failure_to_process_error() {
        let mut exec = Canned(CommandOutput::failed(100, "E: Unable to locate package"));
        let err = exec.execute("apt-get", &["install", "-y", "nope"]).await.unwrap_err();
        match err {
            SetupError::Process {
                command,
                exit_code,
                stderr,
            } => {
                assert_eq!(command, "apt-get install -y nope");
                assert_eq!(exit_code, Some(100));
                assert!(stderr.contains("Unable to locate"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_execute_with_output_returns_stdout() {
        let mut exec = Canned(CommandOutput::ok("web01\n"));
        assert_eq!(exec.execute_with_output("hostname", &[]).await.unwrap(), "web01\n");
    }

    #[test]
    fn test_diagnostic_prefers_stderr() {
        let output = CommandOutput {
            status: Some(1),
            stdout: "partial".to_string(),
            stderr: "  real reason \n".to_string(),
        };
        assert_eq!(output.diagnostic(), "real reason");
        assert_eq!(CommandOutput::ok(" only stdout ").diagnostic(), "only stdout");
    }
}
