// file: src/lib.rs
// version: 3.0.0
// guid: d82472d1-7f0f-4eb4-b0a3-6e1547103eb4

//! # vps-bootstrap
//!
//! Interactive first-boot setup for a fresh Ubuntu/Debian VPS. Asks which of
//! hostname, swap, SSH and fail2ban to configure, applies the confirmed plan
//! through [`executor::CommandExecutor`], then re-reads live state and prints
//! PASS/FAIL/WARN per setting.

pub mod cli;
pub mod collector;
pub mod config;
pub mod error;
pub mod executor;
pub mod logging;
pub mod runner;
pub mod steps;
pub mod ui;
pub mod utils;
pub mod verify;

pub use error::{Result, SetupError};

/// Version information for the utility
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
