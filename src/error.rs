// file: src/error.rs
// version: 3.0.0
// guid: 4f1c8a2e-9b3d-4e7a-a6c5-2d8e0f1b7c93

use thiserror::Error;

/// Result type alias for the application
pub type Result<T> = std::result::Result<T, SetupError>;

/// Error types for the VPS bootstrap tool
///
/// Validation, resource and recovered errors are reported by a step and the run
/// continues. Everything else terminates the run through the top-level boundary
/// in `main`, which maps the variant to a process exit status.
#[derive(Error, Debug)]
pub enum SetupError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Insufficient resources: {0}")]
    Resource(String),

    #[error("Recovered: {0}")]
    Recovered(String),

    #[error("Permission denied: {0}")]
    Permission(String),

    #[error("Command `{command}` failed with exit code {exit_code:?}: {stderr}")]
    Process {
        command: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("System error: {0}")]
    System(String),

    #[error("Interrupted by user")]
    Interrupted,
}

impl SetupError {
    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a new resource error
    pub fn resource(msg: impl Into<String>) -> Self {
        Self::Resource(msg.into())
    }

    /// Create a new recovered error
    pub fn recovered(msg: impl Into<String>) -> Self {
        Self::Recovered(msg.into())
    }

    /// Create a new permission error
    pub fn permission(msg: impl Into<String>) -> Self {
        Self::Permission(msg.into())
    }

    /// Create a new system error
    pub fn system(msg: impl Into<String>) -> Self {
        Self::System(msg.into())
    }

    /// Process exit status for this error category
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) | Self::Yaml(_) => 2,
            Self::Permission(_) => 3,
            Self::Process { .. } => 4,
            Self::Interrupted => 130,
            _ => 1,
        }
    }

    /// Whether a step may report this error and let the run continue
    pub fn is_step_local(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::Resource(_) | Self::Recovered(_)
        )
    }
}
