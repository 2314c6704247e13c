//! Scan results: merged wrappers plus counts over files and test cases.

use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;

mod formatter;

pub use formatter::SummaryFormatter;

use crate::config::SeekerKind;
use crate::merge::ResultWrapper;
use crate::model::{CatalogTestCase, ExecutionStatus};

/// A report file that could not be used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct FileFailure {
    pub path: PathBuf,
    pub seeker: SeekerKind,
    pub message: String,
}

/// A seeker whose report files could not be listed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct SeekerFailure {
    pub seeker: SeekerKind,
    pub include: String,
    pub message: String,
}

/// Counts describing one scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ScanSummary {
    pub files_found: usize,
    pub files_matched: usize,
    pub files_failed: usize,
    pub failures: Vec<FileFailure>,
    pub seeker_failures: Vec<SeekerFailure>,
    pub test_cases_total: usize,
    pub test_cases_matched: usize,
    pub test_cases_unmatched: usize,
    pub passed: usize,
    pub failed: usize,
    pub blocked: usize,
    pub not_run: usize,
}

impl ScanSummary {
    /// Fill the test case counts from the catalog as it will look once the
    /// wrappers are applied.
    pub fn count_test_cases(&mut self, catalog: &[CatalogTestCase], wrappers: &[ResultWrapper]) {
        let statuses = final_statuses(wrappers);
        self.test_cases_total = catalog.len();
        self.test_cases_matched = wrappers.len();
        self.test_cases_unmatched = catalog.len().saturating_sub(wrappers.len());
        self.passed = 0;
        self.failed = 0;
        self.blocked = 0;
        self.not_run = 0;
        for test_case in catalog {
            let status = if test_case.is_blocked() {
                test_case.execution_status
            } else {
                statuses
                    .get(&test_case.id)
                    .copied()
                    .unwrap_or(test_case.execution_status)
            };
            match status {
                ExecutionStatus::Passed => self.passed += 1,
                ExecutionStatus::Failed => self.failed += 1,
                ExecutionStatus::Blocked => self.blocked += 1,
                ExecutionStatus::NotRun => self.not_run += 1,
            }
        }
    }
}

fn final_statuses(wrappers: &[ResultWrapper]) -> HashMap<u32, ExecutionStatus> {
    wrappers
        .iter()
        .map(|w| (w.test_case.id, w.status()))
        .collect()
}

/// Everything a scan produced.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ScanOutcome {
    /// One wrapper per matched test case, in first-match order.
    pub wrappers: Vec<ResultWrapper>,
    pub summary: ScanSummary,
}

impl ScanOutcome {
    /// Write final statuses into the catalog. Blocked and unmatched test
    /// cases keep their status.
    pub fn apply_to(&self, catalog: &mut [CatalogTestCase]) {
        let statuses = final_statuses(&self.wrappers);
        for test_case in catalog.iter_mut().filter(|tc| !tc.is_blocked()) {
            if let Some(status) = statuses.get(&test_case.id) {
                test_case.execution_status = *status;
            }
        }
    }

    pub fn wrapper(&self, test_case_id: u32) -> Option<&ResultWrapper> {
        self.wrappers.iter().find(|w| w.test_case.id == test_case_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::MergeEngine;

    fn catalog() -> Vec<CatalogTestCase> {
        vec![
            CatalogTestCase::new(1, "a"),
            CatalogTestCase::new(2, "b"),
            CatalogTestCase::new(3, "c").with_status(ExecutionStatus::Blocked),
            CatalogTestCase::new(4, "d").with_status(ExecutionStatus::Passed),
        ]
    }

    fn outcome(catalog: &[CatalogTestCase]) -> ScanOutcome {
        let mut engine = MergeEngine::new();
        engine.record(&catalog[0], "k1", ExecutionStatus::Failed, "", Vec::new());
        let wrappers = engine.finish();
        let mut summary = ScanSummary::default();
        summary.count_test_cases(catalog, &wrappers);
        ScanOutcome { wrappers, summary }
    }

    #[test]
    fn test_apply_only_touches_matched() {
        let mut catalog = catalog();
        let outcome = outcome(&catalog);
        outcome.apply_to(&mut catalog);

        assert_eq!(catalog[0].execution_status, ExecutionStatus::Failed);
        assert_eq!(catalog[1].execution_status, ExecutionStatus::NotRun);
        assert_eq!(catalog[2].execution_status, ExecutionStatus::Blocked);
        assert_eq!(catalog[3].execution_status, ExecutionStatus::Passed);
    }

    #[test]
    fn test_counts() {
        let catalog = catalog();
        let summary = outcome(&catalog).summary;
        assert_eq!(summary.test_cases_total, 4);
        assert_eq!(summary.test_cases_matched, 1);
        assert_eq!(summary.test_cases_unmatched, 3);
        assert_eq!(
            (summary.passed, summary.failed, summary.blocked, summary.not_run),
            (1, 1, 1, 1)
        );
    }
}
