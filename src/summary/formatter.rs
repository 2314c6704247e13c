//! Terminal output formatting for scan results.

use std::io::{self, Write};

use super::ScanOutcome;
use crate::dispatch::DispatchReport;
use crate::model::ExecutionStatus;

/// Formats and prints scan results to the terminal.
pub struct SummaryFormatter {
    show_notes: bool,
}

impl SummaryFormatter {
    /// Create a formatter. `show_notes` prints each wrapper's notes as well.
    pub fn new(show_notes: bool) -> Self {
        Self { show_notes }
    }

    /// Print the full report: matched test cases, file failures and summary.
    pub fn report(&self, outcome: &ScanOutcome) {
        let stdout = io::stdout();
        let _ = self.write_report(&mut stdout.lock(), outcome);
    }

    pub fn write_report(&self, out: &mut impl Write, outcome: &ScanOutcome) -> io::Result<()> {
        self.write_cases(out, outcome)?;
        self.write_failures(out, outcome)?;
        self.write_summary(out, outcome)
    }

    fn write_cases(&self, out: &mut impl Write, outcome: &ScanOutcome) -> io::Result<()> {
        for wrapper in &outcome.wrappers {
            let marker = match wrapper.status() {
                ExecutionStatus::Passed => "PASS",
                ExecutionStatus::Failed => "FAIL",
                ExecutionStatus::Blocked => "BLCK",
                ExecutionStatus::NotRun => "NRUN",
            };
            let keys: Vec<&str> = wrapper.key_statuses.keys().map(String::as_str).collect();
            writeln!(
                out,
                "[{marker}] {} {} ({})",
                wrapper.test_case.id,
                wrapper.test_case.name,
                keys.join(", ")
            )?;
            if !wrapper.attachments.is_empty() {
                writeln!(out, "       {} attachment(s)", wrapper.attachments.len())?;
            }
            if self.show_notes && !wrapper.notes.is_empty() {
                for line in wrapper.notes.lines() {
                    writeln!(out, "       | {line}")?;
                }
            }
        }
        Ok(())
    }

    fn write_failures(&self, out: &mut impl Write, outcome: &ScanOutcome) -> io::Result<()> {
        for failure in &outcome.summary.seeker_failures {
            writeln!(
                out,
                "\nseeker {} ({}) skipped: {}",
                failure.seeker, failure.include, failure.message
            )?;
        }
        let failures = &outcome.summary.failures;
        if failures.is_empty() {
            return Ok(());
        }
        writeln!(out, "\n--- unreadable reports ---")?;
        for failure in failures {
            writeln!(
                out,
                "{} [{}]: {}",
                failure.path.display(),
                failure.seeker,
                failure.message
            )?;
        }
        writeln!(out, "--- end unreadable reports ---")
    }

    fn write_summary(&self, out: &mut impl Write, outcome: &ScanOutcome) -> io::Result<()> {
        let s = &outcome.summary;
        writeln!(
            out,
            "\nfiles: {} found, {} matched, {} failed",
            s.files_found, s.files_matched, s.files_failed
        )?;
        writeln!(
            out,
            "test cases: {} total, {} matched, {} unmatched",
            s.test_cases_total, s.test_cases_matched, s.test_cases_unmatched
        )?;
        writeln!(
            out,
            "status: {} passed, {} failed, {} blocked, {} not run",
            s.passed, s.failed, s.blocked, s.not_run
        )
    }

    /// Print what the dispatcher did.
    pub fn report_dispatch(&self, report: &DispatchReport) {
        let stdout = io::stdout();
        let _ = self.write_dispatch(&mut stdout.lock(), report);
    }

    pub fn write_dispatch(&self, out: &mut impl Write, report: &DispatchReport) -> io::Result<()> {
        for execution in &report.executions {
            writeln!(
                out,
                "execution {} -> test case {}: {} ({} attachment(s))",
                execution.execution_id,
                execution.test_case_id,
                execution.status,
                execution.attachments_uploaded
            )?;
        }
        for failure in &report.failures {
            match failure.attachment {
                Some(ref name) => writeln!(
                    out,
                    "FAILED upload {} for test case {}: {}",
                    name, failure.test_case_id, failure.message
                )?,
                None => writeln!(
                    out,
                    "FAILED execution for test case {}: {}",
                    failure.test_case_id, failure.message
                )?,
            }
        }
        let status = if report.is_success() { "ok" } else { "FAILED" };
        writeln!(
            out,
            "dispatch result: {status}. {} reported, {} failed",
            report.executions.len(),
            report.failures.len()
        )
    }
}
