// file: src/verify.rs
// version: 1.0.0
// guid: 7a3d5f0b-c812-4e69-b1a4-9e6c2d7f8b35

//! Post-apply verification results

use std::fmt;

/// Classification of one live-state check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Fail,
    Warn,
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CheckStatus::Pass => "PASS",
            CheckStatus::Fail => "FAIL",
            CheckStatus::Warn => "WARN",
        };
        f.write_str(label)
    }
}

/// Outcome of re-querying one applied setting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub detail: String,
}

impl CheckResult {
    fn new(name: impl Into<String>, status: CheckStatus, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status,
            detail: detail.into(),
        }
    }

    pub fn pass(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(name, CheckStatus::Pass, detail)
    }

    pub fn fail(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(name, CheckStatus::Fail, detail)
    }

    pub fn warn(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(name, CheckStatus::Warn, detail)
    }
}

/// Pass/fail/warn counters accumulated during verification
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VerificationTally {
    pub passed: u32,
    pub failed: u32,
    pub warned: u32,
}

impl VerificationTally {
    pub fn record(&mut self, check: &CheckResult) {
        match check.status {
            CheckStatus::Pass => self.passed += 1,
            CheckStatus::Fail => self.failed += 1,
            CheckStatus::Warn => self.warned += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.passed + self.failed + self.warned
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Final summary line
    pub fn summary(&self) -> String {
        if self.is_empty() {
            return "No changes made".to_string();
        }
        format!(
            "Verification: {} passed, {} failed, {} warnings",
            self.passed, self.failed, self.warned
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tally_counts() {
        let mut tally = VerificationTally::default();
        tally.record(&CheckResult::pass("hostname", "ok"));
        tally.record(&CheckResult::pass("swap", "ok"));
        tally.record(&CheckResult::fail("ssh port", "nope"));
        tally.record(&CheckResult::warn("ssh password", "unknown"));

        assert_eq!(tally.passed, 2);
        assert_eq!(tally.failed, 1);
        assert_eq!(tally.warned, 1);
        assert_eq!(tally.total(), 4);
        assert_eq!(
            tally.summary(),
            "Verification: 2 passed, 1 failed, 1 warnings"
        );
    }

    #[test]
    fn test_empty_tally_reports_no_changes() {
        let tally = VerificationTally::default();
        assert!(tally.is_empty());
        assert_eq!(tally.summary(), "No changes made");
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(CheckStatus::Pass.to_string(), "PASS");
        assert_eq!(CheckStatus::Fail.to_string(), "FAIL");
        assert_eq!(CheckStatus::Warn.to_string(), "WARN");
    }
}
