// file: src/ui.rs
// version: 1.1.0
// guid: 2b7e9c41-d6a0-4f53-8c1e-a4f0b3d95e27

//! Colored status lines and the package-install spinner

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

static QUIET: AtomicBool = AtomicBool::new(false);

/// Suppress informational and success lines; warnings and errors still print
pub fn set_quiet(quiet: bool) {
    QUIET.store(quiet, Ordering::Relaxed);
}

fn quiet() -> bool {
    QUIET.load(Ordering::Relaxed)
}

/// Kind of status line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Header,
    Info,
    Success,
    Warning,
    Error,
}

impl Status {
    /// Warnings and errors are never suppressed
    fn survives_quiet(self) -> bool {
        matches!(self, Status::Warning | Status::Error)
    }
}

/// Render one status line, or `None` when `quiet` suppresses it
pub fn status_line(status: Status, message: &str, quiet: bool) -> Option<String> {
    if quiet && !status.survives_quiet() {
        return None;
    }
    let line = match status {
        Status::Header => format!("\n{} {}", "==>".cyan().bold(), message.bold()),
        Status::Info => format!("  {} {}", "i".blue(), message),
        Status::Success => format!("  {} {}", "✓".green(), message),
        Status::Warning => format!("  {} {}", "!".yellow(), message.yellow()),
        Status::Error => format!("  {} {}", "✗".red(), message.red()),
    };
    Some(line)
}

fn print_status(status: Status, message: &str) {
    if let Some(line) = status_line(status, message, quiet()) {
        println!("{}", line);
    }
}

pub fn print_header(title: &str) {
    print_status(Status::Header, title);
}

pub fn print_info(message: &str) {
    print_status(Status::Info, message);
}

pub fn print_success(message: &str) {
    print_status(Status::Success, message);
}

pub fn print_warning(message: &str) {
    print_status(Status::Warning, message);
}

pub fn print_error(message: &str) {
    print_status(Status::Error, message);
}

/// Terminal spinner shown while a long command runs
///
/// Ticks on its own thread and is cleared when dropped, so an early `?` return
/// never leaves it spinning.
pub struct Spinner {
    bar: ProgressBar,
}

impl Spinner {
    pub fn start(message: impl Into<String>) -> Self {
        let bar = if quiet() {
            ProgressBar::hidden()
        } else {
            ProgressBar::new_spinner()
        };
        if let Ok(style) = ProgressStyle::default_spinner().template("  {spinner:.green} {msg}") {
            bar.set_style(style);
        }
        bar.set_message(message.into());
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar }
    }

    /// Stop the spinner and print a success line in its place
    pub fn finish(self, message: &str) {
        self.bar.finish_and_clear();
        print_success(message);
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}
