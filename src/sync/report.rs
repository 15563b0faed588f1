use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::errors::ComputeError;

/// A non-fatal condition met while computing or reconciling. Issues never
/// abort a pass; they are collected into a [`SyncReport`].
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
pub enum SyncIssue {
    #[error("Could not read cell {address} for {component}.{field}: {reason}")]
    AddressRead {
        component: &'static str,
        field: &'static str,
        address: &'static str,
        reason: String,
    },

    #[error("Could not update cell {address} for {component}.{field}: {reason}")]
    AddressWrite {
        component: &'static str,
        field: &'static str,
        address: &'static str,
        reason: String,
    },

    #[error(
        "Value mismatch in {component}.{field} (cell {address}): sheet={recorded}, calculated={computed}"
    )]
    ToleranceViolation {
        component: &'static str,
        field: &'static str,
        address: &'static str,
        recorded: f64,
        computed: f64,
    },

    #[error("{component}.{field} (cell {address}) computed a non-finite value: {value}")]
    NonFiniteResult {
        component: &'static str,
        field: &'static str,
        address: &'static str,
        value: f64,
    },

    #[error("Computation skipped: {0}")]
    Compute(#[from] ComputeError),
}

impl SyncIssue {
    pub fn is_io(&self) -> bool {
        matches!(
            self,
            SyncIssue::AddressRead { .. } | SyncIssue::AddressWrite { .. }
        )
    }

    pub fn is_tolerance_violation(&self) -> bool {
        matches!(self, SyncIssue::ToleranceViolation { .. })
    }
}

/// Issues collected by one protocol operation, in the order they occurred.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SyncReport {
    issues: Vec<SyncIssue>,
}

impl SyncReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, issue: impl Into<SyncIssue>) {
        let issue = issue.into();
        log::warn!("{issue}");
        self.issues.push(issue);
    }

    pub fn merge(&mut self, other: SyncReport) {
        self.issues.extend(other.issues);
    }

    pub fn issues(&self) -> &[SyncIssue] {
        &self.issues
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn io_errors(&self) -> usize {
        self.issues.iter().filter(|issue| issue.is_io()).count()
    }

    pub fn tolerance_violations(&self) -> usize {
        self.issues
            .iter()
            .filter(|issue| issue.is_tolerance_violation())
            .count()
    }

    pub fn non_finite_results(&self) -> usize {
        self.issues
            .iter()
            .filter(|issue| matches!(issue, SyncIssue::NonFiniteResult { .. }))
            .count()
    }

    pub fn compute_failures(&self) -> usize {
        self.issues
            .iter()
            .filter(|issue| matches!(issue, SyncIssue::Compute(_)))
            .count()
    }
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_clean() {
            return write!(f, "no issues");
        }
        write!(
            f,
            "{} issue(s): {} I/O, {} mismatch, {} non-finite, {} skipped",
            self.len(),
            self.io_errors(),
            self.tolerance_violations(),
            self.non_finite_results(),
            self.compute_failures()
        )
    }
}

/// Result of `Environment::validate`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationOutcome {
    pub passed: bool,
    pub report: SyncReport,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mismatch() -> SyncIssue {
        SyncIssue::ToleranceViolation {
            component: "wing",
            field: "volume",
            address: "E4",
            recorded: 0.05,
            computed: 0.042525,
        }
    }

    #[test]
    fn test_counts() {
        let mut report = SyncReport::new();
        assert!(report.is_clean());
        assert_eq!(report.to_string(), "no issues");

        report.push(mismatch());
        report.push(SyncIssue::AddressRead {
            component: "atmosphere",
            field: "ref_density",
            address: "I34",
            reason: "unparsable value `abc`".to_string(),
        });
        report.push(ComputeError::MissingInput {
            component: "wing",
            field: "span",
        });

        assert_eq!(report.len(), 3);
        assert_eq!(report.io_errors(), 1);
        assert_eq!(report.tolerance_violations(), 1);
        assert_eq!(report.compute_failures(), 1);
        assert_eq!(
            report.to_string(),
            "3 issue(s): 1 I/O, 1 mismatch, 0 non-finite, 1 skipped"
        );
    }

    #[test]
    fn test_merge_keeps_order() {
        let mut first = SyncReport::new();
        first.push(mismatch());
        let mut second = SyncReport::new();
        second.push(ComputeError::MissingInput {
            component: "fin",
            field: "span",
        });

        first.merge(second);
        assert!(first.issues()[0].is_tolerance_violation());
        assert!(matches!(first.issues()[1], SyncIssue::Compute(_)));
    }

    #[test]
    fn test_issue_message() {
        assert_eq!(
            mismatch().to_string(),
            "Value mismatch in wing.volume (cell E4): sheet=0.05, calculated=0.042525"
        );
    }
}
