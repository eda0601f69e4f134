// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright © 2024-2025 DataScienceBioLab

//! Pass/fail-with-diagnostics report for a scenario run.
//!
//! A bare `assert!` tells you a scenario failed; it doesn't tell you which
//! step in a multi-tick gesture diverged from the expected action sequence.

use serde::{Deserialize, Serialize};

/// Result of a single check within a scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationCheck {
    /// Name of the check, usually the scenario name plus a short suffix.
    pub name: String,
    /// Whether the check passed.
    pub passed: bool,
    /// Detailed message, including expected vs. actual on failure.
    pub message: String,
}

/// Overall result of a validation run across one or more scenarios.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Every check that was run, in order.
    pub checks: Vec<ValidationCheck>,
    /// Whether every check passed.
    pub all_passed: bool,
    /// Summary counts.
    pub stats: ValidationStats,
}

/// Pass/fail counts for a [`ValidationResult`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationStats {
    /// Total checks run.
    pub total: usize,
    /// Checks that passed.
    pub passed: usize,
    /// Checks that failed.
    pub failed: usize,
}

impl ValidationResult {
    /// Whether every check passed.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.all_passed
    }

    /// The checks that failed, for reporting.
    #[must_use]
    pub fn failures(&self) -> Vec<&ValidationCheck> {
        self.checks.iter().filter(|c| !c.passed).collect()
    }
}

/// Accumulates checks for one validation run.
#[derive(Debug, Default)]
pub struct Validator {
    checks: Vec<ValidationCheck>,
}

impl Validator {
    /// An empty validator.
    #[must_use]
    pub fn new() -> Self {
        Self { checks: Vec::new() }
    }

    /// Record a check result.
    pub fn check(&mut self, name: impl Into<String>, passed: bool, message: impl Into<String>) {
        self.checks.push(ValidationCheck {
            name: name.into(),
            passed,
            message: message.into(),
        });
    }

    /// Record a check that two debug-formattable values were equal, building
    /// the failure message from the mismatch.
    pub fn check_eq<T: std::fmt::Debug + PartialEq>(
        &mut self,
        name: impl Into<String>,
        actual: &T,
        expected: &T,
    ) {
        let passed = actual == expected;
        let message = if passed {
            "matched expected".to_string()
        } else {
            format!("expected {expected:?}, got {actual:?}")
        };
        self.check(name, passed, message);
    }

    /// Finalize into a [`ValidationResult`].
    #[must_use]
    pub fn build(self) -> ValidationResult {
        let total = self.checks.len();
        let passed = self.checks.iter().filter(|c| c.passed).count();
        let failed = total - passed;
        ValidationResult {
            checks: self.checks,
            all_passed: failed == 0,
            stats: ValidationStats { total, passed, failed },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mixed_results_report_correct_stats() {
        let mut v = Validator::new();
        v.check("a", true, "ok");
        v.check("b", false, "nope");
        let result = v.build();
        assert!(!result.is_valid());
        assert_eq!(result.stats.total, 2);
        assert_eq!(result.stats.passed, 1);
        assert_eq!(result.stats.failed, 1);
        assert_eq!(result.failures().len(), 1);
    }

    #[test]
    fn check_eq_reports_mismatch_in_message() {
        let mut v = Validator::new();
        v.check_eq("positions", &(1, 2), &(1, 3));
        let result = v.build();
        assert!(!result.is_valid());
        assert!(result.checks[0].message.contains("(1, 3)"));
    }

    #[test]
    fn empty_validator_passes() {
        let result = Validator::new().build();
        assert!(result.is_valid());
        assert_eq!(result.stats.total, 0);
    }
}
