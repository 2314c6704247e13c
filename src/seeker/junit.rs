use super::{ResultSeeker, SeekUnit, join_identity, non_blank, notes, wrong_report};
use crate::config::SeekerKind;
use crate::core::context::{ReportFile, ScanContext};
use crate::core::error::Result;
use crate::model::ExecutionStatus;
use crate::report::ParsedReport;
use crate::report::junit::{JUnitCase, JUnitReport};

/// Seeker over JUnit reports, by suite name, case name, class name or
/// `classname.name`.
pub struct JUnitSeeker {
    kind: SeekerKind,
}

impl JUnitSeeker {
    /// Create a JUnit seeker. `kind` must be one of the JUnit kinds.
    pub fn new(kind: SeekerKind) -> Self {
        Self { kind }
    }

    fn suite_units(&self, ctx: &ScanContext, report: &JUnitReport) -> Vec<SeekUnit> {
        let mut units = Vec::new();
        for suite in report.all_suites() {
            if suite.name.trim().is_empty() {
                continue;
            }
            let Some(status) = skip_aware(suite.status(), ctx) else {
                tracing::debug!(suite = %suite.name, "skipped suite left out");
                continue;
            };
            let mut unit = SeekUnit::new(suite.name.trim(), status);
            if ctx.config.include_notes {
                unit.notes = notes::junit_suite(suite);
            }
            units.push(unit);
        }
        units
    }

    fn case_units(&self, ctx: &ScanContext, report: &JUnitReport) -> Vec<SeekUnit> {
        let mut units = Vec::new();
        for suite in report.all_suites() {
            for case in &suite.cases {
                let Some(identity) = self.case_identity(case) else {
                    continue;
                };
                let Some(status) = skip_aware(case.status(), ctx) else {
                    continue;
                };
                let mut unit = SeekUnit::new(identity, status);
                if ctx.config.include_notes {
                    unit.notes = notes::junit_case(case);
                }
                units.push(unit);
            }
        }
        units
    }

    fn case_identity(&self, case: &JUnitCase) -> Option<String> {
        match self.kind {
            SeekerKind::JunitCaseName => non_blank(&case.name),
            SeekerKind::JunitClassName => case.classname.as_deref().and_then(non_blank),
            _ => join_identity(case.classname.as_deref(), '.', &case.name),
        }
    }
}

/// Skipped units are left out unless they should count as blocked.
fn skip_aware(status: Option<ExecutionStatus>, ctx: &ScanContext) -> Option<ExecutionStatus> {
    match status {
        Some(status) => Some(status),
        None if ctx.config.mark_skipped_as_blocked => Some(ExecutionStatus::Blocked),
        None => None,
    }
}

impl ResultSeeker for JUnitSeeker {
    fn kind(&self) -> SeekerKind {
        self.kind
    }

    fn units(
        &self,
        ctx: &ScanContext,
        _file: &ReportFile,
        report: &ParsedReport,
    ) -> Result<Vec<SeekUnit>> {
        let ParsedReport::JUnit(report) = report else {
            return Err(wrong_report(self, report));
        };
        Ok(match self.kind {
            SeekerKind::JunitSuiteName => self.suite_units(ctx, report),
            _ => self.case_units(ctx, report),
        })
    }

    fn name(&self) -> &str {
        self.kind.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::report::junit::parse_junit_str;
    use std::path::Path;

    const REPORT: &str = r#"<testsuites>
  <testsuite name="a.LoginTest" tests="3" failures="1">
    <testcase name="valid" classname="a.LoginTest" time="0.1"/>
    <testcase name="invalid" classname="a.LoginTest"><failure message="expected error"/></testcase>
    <testcase name="later" classname="a.LoginTest"><skipped/></testcase>
  </testsuite>
  <testsuite name="a.LogoutTest" tests="1">
    <testcase name="logout" classname="a.LogoutTest"/>
  </testsuite>
  <testsuite name="a.SkippedTest" tests="1">
    <testcase name="never" classname="a.SkippedTest"><skipped/></testcase>
  </testsuite>
</testsuites>"#;

    fn units(kind: SeekerKind, config: Config) -> Vec<SeekUnit> {
        let report = parse_junit_str(REPORT, Path::new("TEST-a.xml")).unwrap();
        let ctx = ScanContext::new(config);
        let file = ctx.report_file("TEST-a.xml");
        JUnitSeeker::new(kind)
            .units(&ctx, &file, &ParsedReport::JUnit(report))
            .unwrap()
    }

    fn statuses(units: &[SeekUnit]) -> Vec<(&str, ExecutionStatus)> {
        units.iter().map(|u| (u.identity.as_str(), u.status)).collect()
    }

    #[test]
    fn test_suite_name_mode() {
        let units = units(SeekerKind::JunitSuiteName, Config::default());
        assert_eq!(
            statuses(&units),
            vec![
                ("a.LoginTest", ExecutionStatus::Failed),
                ("a.LogoutTest", ExecutionStatus::Passed),
            ]
        );
        assert!(units[0].notes.contains("JUnit suite: a.LoginTest"));
    }

    #[test]
    fn test_skipped_suite_as_blocked() {
        let config = Config {
            mark_skipped_as_blocked: true,
            ..Config::default()
        };
        let units = units(SeekerKind::JunitSuiteName, config);
        assert_eq!(units[2].identity, "a.SkippedTest");
        assert_eq!(units[2].status, ExecutionStatus::Blocked);
    }

    #[test]
    fn test_case_name_mode() {
        let units = units(SeekerKind::JunitCaseName, Config::default());
        assert_eq!(
            statuses(&units),
            vec![
                ("valid", ExecutionStatus::Passed),
                ("invalid", ExecutionStatus::Failed),
                ("logout", ExecutionStatus::Passed),
            ]
        );
    }

    #[test]
    fn test_class_name_mode_yields_one_unit_per_case() {
        let units = units(SeekerKind::JunitClassName, Config::default());
        let identities: Vec<_> = units.iter().map(|u| u.identity.as_str()).collect();
        assert_eq!(identities, vec!["a.LoginTest", "a.LoginTest", "a.LogoutTest"]);

        let merged = crate::seeker::coalesce(units);
        assert_eq!(merged[0].status, ExecutionStatus::Failed);
    }

    #[test]
    fn test_method_name_mode() {
        let units = units(SeekerKind::JunitMethodName, Config::default());
        assert_eq!(units[0].identity, "a.LoginTest.valid");
        assert_eq!(units[1].identity, "a.LoginTest.invalid");
        assert_eq!(units[1].status, ExecutionStatus::Failed);
    }

    #[test]
    fn test_notes_disabled() {
        let config = Config {
            include_notes: false,
            ..Config::default()
        };
        let units = units(SeekerKind::JunitMethodName, config);
        assert!(units.iter().all(|u| u.notes.is_empty()));
    }

    #[test]
    fn test_method_identity_falls_back() {
        let seeker = JUnitSeeker::new(SeekerKind::JunitMethodName);
        let case = JUnitCase {
            name: "solo".to_string(),
            ..Default::default()
        };
        assert_eq!(seeker.case_identity(&case).as_deref(), Some("solo"));
        let blank = JUnitCase::default();
        assert_eq!(seeker.case_identity(&blank), None);
    }

    #[test]
    fn test_wrong_report_variant() {
        let ctx = ScanContext::new(Config::default());
        let file = ctx.report_file("x.tap");
        let report = ParsedReport::Tap(Default::default());
        let err = JUnitSeeker::new(SeekerKind::JunitCaseName)
            .units(&ctx, &file, &report)
            .unwrap_err();
        assert!(err.to_string().contains("cannot read tap"));
    }
}
