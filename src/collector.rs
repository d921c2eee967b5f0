// file: src/collector.rs
// version: 1.0.0
// guid: 5c0a8e3d-2f69-4b17-9d4e-7a1b6c2f08e5

//! Interactive collection of the setup plan
//!
//! Every answer is validated as soon as it is typed. A bad value is reported
//! and the setting is dropped from the plan; there is no retry loop.

use crate::config::plan::{parse_ssh_port, parse_swap_size, validate_hostname};
use crate::config::{Secret, SetupPlan};
use crate::error::{Result, SetupError};
use crate::ui;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use std::io::{self, BufRead, IsTerminal, Write};
use tracing::{info, warn};

/// Source of the administrator's answers
pub trait Prompter {
    /// Ask a yes/no question; anything but yes means no
    fn confirm(&mut self, question: &str) -> Result<bool>;

    /// Ask for a line of text
    fn input(&mut self, prompt: &str) -> Result<String>;

    /// Ask for a secret without echoing it
    fn password(&mut self, prompt: &str) -> Result<String>;
}

/// Interpret a yes/no answer
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Prompter reading from the controlling terminal, or stdin when piped
pub struct TerminalPrompter {
    stdin: io::Stdin,
}

impl TerminalPrompter {
    pub fn new() -> Self {
        Self { stdin: io::stdin() }
    }

    fn read_line(&mut self) -> Result<String> {
        let mut line = String::new();
        // EOF leaves the line empty, which reads as "no"
        self.stdin.lock().read_line(&mut line)?;
        Ok(line.trim_end_matches(&['\r', '\n'][..]).to_string())
    }

    fn ask(&mut self, prompt: &str) -> Result<()> {
        print!("  {} ", prompt);
        io::stdout().flush()?;
        Ok(())
    }

    fn read_hidden(&mut self) -> Result<String> {
        terminal::enable_raw_mode()?;
        let result = read_hidden_keys();
        terminal::disable_raw_mode()?;
        println!();
        result
    }
}

fn read_hidden_keys() -> Result<String> {
    let mut secret = String::new();
    loop {
        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match key.code {
                KeyCode::Enter => return Ok(secret),
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    return Err(SetupError::Interrupted);
                }
                KeyCode::Char(c) => secret.push(c),
                KeyCode::Backspace => {
                    secret.pop();
                }
                KeyCode::Esc => return Ok(String::new()),
                _ => {}
            }
        }
    }
}

impl Default for TerminalPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompter for TerminalPrompter {
    fn confirm(&mut self, question: &str) -> Result<bool> {
        self.ask(&format!("{} [y/N]:", question))?;
        Ok(is_affirmative(&self.read_line()?))
    }

    fn input(&mut self, prompt: &str) -> Result<String> {
        self.ask(prompt)?;
        self.read_line()
    }

    fn password(&mut self, prompt: &str) -> Result<String> {
        self.ask(prompt)?;
        if self.stdin.is_terminal() {
            self.read_hidden()
        } else {
            self.read_line()
        }
    }
}

/// Ask the four setting groups in order and build a validated plan
pub fn collect_plan(prompter: &mut dyn Prompter, password_user: &str) -> Result<SetupPlan> {
    let mut plan = SetupPlan::default();

    if prompter.confirm("Change the hostname?")? {
        let hostname = prompter.input("New hostname:")?.trim().to_string();
        match validate_hostname(&hostname) {
            Ok(()) => plan.hostname = Some(hostname),
            Err(e) => reject(&e),
        }
    }

    if prompter.confirm("Create a swap file?")? {
        let answer = prompter.input("Swap size in MB:")?;
        match parse_swap_size(&answer) {
            Ok(size) => plan.swap_size_mb = Some(size),
            Err(e) => reject(&e),
        }
    }

    if prompter.confirm("Configure SSH (port and/or password)?")? {
        let answer = prompter.input("New SSH port (blank to keep current):")?;
        if !answer.trim().is_empty() {
            match parse_ssh_port(&answer) {
                Ok(port) => plan.ssh_port = Some(port),
                Err(e) => reject(&e),
            }
        }

        let password = prompter.password(&format!(
            "New password for {} (blank to keep current):",
            password_user
        ))?;
        if !password.is_empty() {
            plan.ssh_password = Some(Secret::new(password));
        }
    }

    plan.fail2ban_enabled = prompter.confirm("Install and enable fail2ban for SSH?")?;

    info!("Collected plan: {:?}", plan);
    Ok(plan)
}

fn reject(err: &SetupError) {
    warn!("Discarding answer: {}", err);
    ui::print_warning(&format!("{}; setting skipped", err));
}
