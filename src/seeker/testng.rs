use super::{ResultSeeker, SeekUnit, join_identity, non_blank, notes, wrong_report};
use crate::config::SeekerKind;
use crate::core::context::{ReportFile, ScanContext};
use crate::core::error::Result;
use crate::model::ExecutionStatus;
use crate::report::ParsedReport;
use crate::report::testng::{TestNgClass, TestNgMethod, TestNgReport, TestNgStatus};

/// Seeker over TestNG reports, by suite name, class name or `class#method`.
pub struct TestNgSeeker {
    kind: SeekerKind,
}

impl TestNgSeeker {
    /// Create a TestNG seeker. `kind` must be one of the TestNG kinds.
    pub fn new(kind: SeekerKind) -> Self {
        Self { kind }
    }

    fn suite_units(&self, ctx: &ScanContext, report: &TestNgReport) -> Vec<SeekUnit> {
        report
            .suites
            .iter()
            .filter_map(|suite| {
                let identity = non_blank(&suite.name)?;
                let status = if ctx.config.mark_skipped_as_blocked {
                    grouped_status(suite.classes(), suite.status())
                } else {
                    suite.status()
                };
                let mut unit = SeekUnit::new(identity, status);
                if ctx.config.include_notes {
                    unit.notes = notes::testng_suite(suite);
                }
                Some(unit)
            })
            .collect()
    }

    fn class_units(&self, ctx: &ScanContext, report: &TestNgReport) -> Vec<SeekUnit> {
        report
            .suites
            .iter()
            .flat_map(|suite| suite.classes())
            .filter_map(|class| {
                let identity = non_blank(&class.name)?;
                let status = if ctx.config.mark_skipped_as_blocked {
                    grouped_status(std::iter::once(class), class.status())
                } else {
                    class.status()
                };
                let mut unit = SeekUnit::new(identity, status);
                if ctx.config.include_notes {
                    unit.notes = notes::testng_class(class);
                }
                Some(unit)
            })
            .collect()
    }

    fn method_units(&self, ctx: &ScanContext, report: &TestNgReport) -> Vec<SeekUnit> {
        let mut units = Vec::new();
        for class in report.suites.iter().flat_map(|s| s.classes()) {
            for method in class.test_methods() {
                let Some(identity) = join_identity(Some(&class.name), '#', &method.name) else {
                    continue;
                };
                let mut unit = SeekUnit::new(identity, method_status(method, ctx));
                if ctx.config.include_notes {
                    unit.notes = notes::testng_method(class, method);
                }
                units.push(unit);
            }
        }
        units
    }
}

/// `PASS` passes, `SKIP` is blocked when configured, anything else fails.
fn method_status(method: &TestNgMethod, ctx: &ScanContext) -> ExecutionStatus {
    match method.status {
        TestNgStatus::Pass => ExecutionStatus::Passed,
        TestNgStatus::Skip if ctx.config.mark_skipped_as_blocked => ExecutionStatus::Blocked,
        _ => ExecutionStatus::Failed,
    }
}

/// Status of a group of classes when skips count as blocked: the fold of the
/// method statuses, or `fallback` when there are no test methods at all.
fn grouped_status<'a>(
    classes: impl Iterator<Item = &'a TestNgClass>,
    fallback: ExecutionStatus,
) -> ExecutionStatus {
    let statuses: Vec<ExecutionStatus> = classes
        .flat_map(TestNgClass::test_methods)
        .map(|m| match m.status {
            TestNgStatus::Pass => ExecutionStatus::Passed,
            TestNgStatus::Skip => ExecutionStatus::Blocked,
            _ => ExecutionStatus::Failed,
        })
        .collect();
    if statuses.is_empty() {
        fallback
    } else {
        ExecutionStatus::fold(statuses)
    }
}

impl ResultSeeker for TestNgSeeker {
    fn kind(&self) -> SeekerKind {
        self.kind
    }

    fn units(
        &self,
        ctx: &ScanContext,
        _file: &ReportFile,
        report: &ParsedReport,
    ) -> Result<Vec<SeekUnit>> {
        let ParsedReport::TestNg(report) = report else {
            return Err(wrong_report(self, report));
        };
        Ok(match self.kind {
            SeekerKind::TestngSuiteName => self.suite_units(ctx, report),
            SeekerKind::TestngClassName => self.class_units(ctx, report),
            _ => self.method_units(ctx, report),
        })
    }

    fn name(&self) -> &str {
        self.kind.as_str()
    }
}
