// file: src/logging/logger.rs
// version: 2.0.0
// guid: j0k1l2m3-n4o5-6789-0123-456789jklmno

//! Logger initialization and configuration
//!
//! Two layers: a console layer on stderr that stays silent unless asked for,
//! and a file layer that records every command at debug level.

use crate::error::{Result, SetupError};
use crate::ui;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Filter directive for the console layer
///
/// `RUST_LOG` only applies when neither flag was given.
pub fn console_directive(verbose: bool, quiet: bool, env: Option<&str>) -> String {
    if quiet {
        "off".to_string()
    } else if verbose {
        "debug".to_string()
    } else {
        env.filter(|d| !d.trim().is_empty())
            .unwrap_or("off")
            .to_string()
    }
}

/// Open the log file for appending, creating its directory if needed
pub fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Initialize the logging system
///
/// Returns whether the file layer is active. A log file that cannot be
/// opened is reported and the run continues with console logging only.
pub fn init_logger(verbose: bool, quiet: bool, log_file: &Path) -> Result<bool> {
    ui::set_quiet(quiet);

    let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let console_filter = EnvFilter::try_new(console_directive(verbose, quiet, env.as_deref()))
        .unwrap_or_else(|_| EnvFilter::new("off"));

    let console_layer = fmt::layer()
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .with_filter(console_filter);

    let (file_layer, file_error) = match open_log_file(log_file) {
        Ok(file) => (
            Some(
                fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(Arc::new(file))
                    .with_filter(EnvFilter::new("debug")),
            ),
            None,
        ),
        Err(e) => (None, Some(e)),
    };
    let file_active = file_layer.is_some();

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| SetupError::config(format!("Failed to initialize logger: {}", e)))?;

    match file_error {
        None => info!(
            "vps-bootstrap {} started at {}, logging to {}",
            crate::VERSION,
            chrono::Local::now().to_rfc3339(),
            log_file.display()
        ),
        Some(e) => {
            warn!("Cannot open log file {}: {}", log_file.display(), e);
            ui::print_warning(&format!(
                "Cannot open log file {} ({}); continuing without a log file",
                log_file.display(),
                e
            ));
        }
    }

    Ok(file_active)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_console_is_silent_by_default() {
        assert_eq!(console_directive(false, false, None), "off");
        assert_eq!(console_directive(false, false, Some("  ")), "off");
    }

    #[test]
    fn test_console_flags_override_env() {
        assert_eq!(console_directive(true, false, Some("warn")), "debug");
        assert_eq!(console_directive(false, true, Some("trace")), "off");
        assert_eq!(console_directive(false, false, Some("info")), "info");
    }

    #[test]
    fn test_open_log_file_appends() {
        // Arrange
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("bootstrap.log");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "first\n").unwrap();

        // Act
        let file = open_log_file(&path);

        // Assert
        assert!(file.is_ok());
        io::Write::write_all(&mut file.unwrap(), b"second\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "first\nsecond\n");
    }

    #[test]
    fn test_open_log_file_in_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("a").join("b").join("run.log");

        assert!(open_log_file(&path).is_ok());
        assert!(path.exists());
    }

    #[test]
    fn test_open_log_file_fails_under_regular_file() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("not-a-dir");
        fs::write(&blocker, "").unwrap();

        assert!(open_log_file(&blocker.join("run.log")).is_err());
    }

    #[test]
    fn test_init_logger_writes_start_line() {
        // Only one test may install the global subscriber
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bootstrap.log");

        let active = init_logger(false, false, &path).unwrap();

        assert!(active);
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("vps-bootstrap"));
        assert!(content.contains("started at"));
    }
}
