//! JUnit XML parser.
//!
//! Accepts a bare `<testsuite>`, several sibling `<testsuite>` roots, a
//! `<testsuites>` wrapper, and suites nested inside suites. Suite-level
//! `<failure>`/`<error>` elements (direct children of `<testsuite>`) are kept
//! apart from case-level ones; both count toward the suite's status.

use std::path::Path;

use super::xml::{Attrs, XmlEvent, read_events};
use super::{ParsedReport, ReportFormat, ReportParser};
use crate::core::error::{Error, Result};
use crate::model::ExecutionStatus;

/// Every suite found in one JUnit file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JUnitReport {
    /// Top-level suites in document order.
    pub suites: Vec<JUnitSuite>,
}

impl JUnitReport {
    /// All suites, depth first, including nested ones.
    pub fn all_suites(&self) -> Vec<&JUnitSuite> {
        let mut out = Vec::new();
        for suite in &self.suites {
            suite.collect_into(&mut out);
        }
        out
    }
}

/// A `<testsuite>` element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JUnitSuite {
    pub name: String,
    pub package: Option<String>,
    pub id: Option<String>,
    pub hostname: Option<String>,
    pub timestamp: Option<String>,
    pub time: Option<f64>,
    pub declared_tests: Option<u32>,
    pub declared_failures: Option<u32>,
    pub declared_errors: Option<u32>,
    pub declared_skipped: Option<u32>,
    pub properties: Vec<(String, String)>,
    pub cases: Vec<JUnitCase>,
    /// Failures declared directly on the suite.
    pub failures: Vec<JUnitIssue>,
    /// Errors declared directly on the suite.
    pub errors: Vec<JUnitIssue>,
    pub skipped: Option<JUnitSkip>,
    pub system_out: Option<String>,
    pub system_err: Option<String>,
    pub suites: Vec<JUnitSuite>,
}

impl JUnitSuite {
    fn from_attrs(attrs: &Attrs) -> Self {
        Self {
            name: attrs.string("name").unwrap_or_default(),
            package: attrs.string("package"),
            id: attrs.string("id"),
            hostname: attrs.string("hostname"),
            timestamp: attrs.string("timestamp"),
            time: attrs.f64("time"),
            declared_tests: attrs.u32("tests"),
            declared_failures: attrs.u32("failures"),
            declared_errors: attrs.u32("errors"),
            declared_skipped: attrs.u32("skipped").or_else(|| attrs.u32("disabled")),
            ..Default::default()
        }
    }

    fn collect_into<'a>(&'a self, out: &mut Vec<&'a JUnitSuite>) {
        out.push(self);
        for nested in &self.suites {
            nested.collect_into(out);
        }
    }

    /// Skipped suites carry a `<skipped>` child, or contain only skipped cases.
    pub fn is_skipped(&self) -> bool {
        self.skipped.is_some()
            || (!self.cases.is_empty()
                && self.suites.is_empty()
                && self.cases.iter().all(JUnitCase::is_skipped))
    }

    /// `<failure>` elements on the suite and its own cases.
    fn own_failure_elements(&self) -> u32 {
        let case_level: usize = self.cases.iter().map(|c| c.failures.len()).sum();
        (self.failures.len() + case_level) as u32
    }

    /// `<error>` elements on the suite and its own cases.
    fn own_error_elements(&self) -> u32 {
        let case_level: usize = self.cases.iter().map(|c| c.errors.len()).sum();
        (self.errors.len() + case_level) as u32
    }

    fn total_failure_elements(&self) -> u32 {
        self.own_failure_elements()
            + self.suites.iter().map(JUnitSuite::total_failure_elements).sum::<u32>()
    }

    fn total_error_elements(&self) -> u32 {
        self.own_error_elements()
            + self.suites.iter().map(JUnitSuite::total_error_elements).sum::<u32>()
    }

    /// Failures that count toward status: suite-level ones, those of
    /// non-skipped cases, and those of non-skipped nested suites.
    pub fn failure_count(&self) -> u32 {
        let cases: usize = self
            .cases
            .iter()
            .filter(|c| !c.is_skipped())
            .map(|c| c.failures.len())
            .sum();
        let nested: u32 = self
            .suites
            .iter()
            .filter(|s| !s.is_skipped())
            .map(JUnitSuite::failure_count)
            .sum();
        self.failures.len() as u32 + cases as u32 + nested
    }

    /// Errors that count toward status, with the same exclusions as failures.
    pub fn error_count(&self) -> u32 {
        let cases: usize = self
            .cases
            .iter()
            .filter(|c| !c.is_skipped())
            .map(|c| c.errors.len())
            .sum();
        let nested: u32 = self
            .suites
            .iter()
            .filter(|s| !s.is_skipped())
            .map(JUnitSuite::error_count)
            .sum();
        self.errors.len() as u32 + cases as u32 + nested
    }

    /// `None` for a skipped suite, otherwise failed when any failure or error
    /// is present.
    pub fn status(&self) -> Option<ExecutionStatus> {
        if self.is_skipped() {
            return None;
        }
        if self.failure_count() + self.error_count() > 0 {
            Some(ExecutionStatus::Failed)
        } else {
            Some(ExecutionStatus::Passed)
        }
    }

    /// Compare declared counts with parsed elements.
    ///
    /// Producers differ on whether a parent suite's counts include its
    /// nested suites, so either reading is accepted.
    fn validate(&self, path: &Path) -> Result<()> {
        check_count(
            path,
            &self.name,
            "failures",
            self.declared_failures,
            self.own_failure_elements(),
            self.total_failure_elements(),
        )?;
        check_count(
            path,
            &self.name,
            "errors",
            self.declared_errors,
            self.own_error_elements(),
            self.total_error_elements(),
        )
    }
}

fn check_count(
    path: &Path,
    suite: &str,
    what: &str,
    declared: Option<u32>,
    own: u32,
    total: u32,
) -> Result<()> {
    match declared {
        Some(d) if d != own && d != total => Err(Error::validation(
            path,
            format!(
                "suite '{}' declares {}=\"{}\" but contains {} <{}> element(s)",
                suite,
                what,
                d,
                total,
                what.trim_end_matches('s')
            ),
        )),
        _ => Ok(()),
    }
}

/// A `<testcase>` element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JUnitCase {
    pub name: String,
    pub classname: Option<String>,
    pub time: Option<f64>,
    pub failures: Vec<JUnitIssue>,
    pub errors: Vec<JUnitIssue>,
    pub skipped: Option<JUnitSkip>,
    pub system_out: Option<String>,
    pub system_err: Option<String>,
}

impl JUnitCase {
    fn from_attrs(attrs: &Attrs) -> Self {
        Self {
            name: attrs.string("name").unwrap_or_default(),
            classname: attrs.string("classname"),
            time: attrs.f64("time"),
            ..Default::default()
        }
    }

    pub fn is_skipped(&self) -> bool {
        self.skipped.is_some()
    }

    /// `None` for a skipped case, otherwise failed when any failure or error
    /// is present.
    pub fn status(&self) -> Option<ExecutionStatus> {
        if self.is_skipped() {
            None
        } else if self.failures.is_empty() && self.errors.is_empty() {
            Some(ExecutionStatus::Passed)
        } else {
            Some(ExecutionStatus::Failed)
        }
    }
}

/// Kind of a `<failure>` or `<error>` element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueKind {
    Failure,
    Error,
}

/// A `<failure>` or `<error>` element.
#[derive(Debug, Clone, PartialEq)]
pub struct JUnitIssue {
    pub kind: IssueKind,
    pub message: Option<String>,
    pub issue_type: Option<String>,
    pub text: String,
}

/// A `<skipped>` marker.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JUnitSkip {
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputKind {
    Stdout,
    Stderr,
}

/// One open element and the node it is building.
enum Frame {
    Suites,
    Suite(JUnitSuite),
    Case(JUnitCase),
    Issue(JUnitIssue),
    Skipped(JUnitSkip),
    Output { kind: OutputKind, text: String },
    Properties,
    Ignored,
}

/// Builds a [`JUnitReport`] from XML events.
struct JUnitBuilder<'p> {
    path: &'p Path,
    stack: Vec<Frame>,
    report: JUnitReport,
}

impl<'p> JUnitBuilder<'p> {
    fn new(path: &'p Path) -> Self {
        Self {
            path,
            stack: Vec::new(),
            report: JUnitReport::default(),
        }
    }

    fn handle(&mut self, event: XmlEvent) -> Result<()> {
        match event {
            XmlEvent::Open { name, attrs } => self.open(&name, &attrs),
            XmlEvent::Close { .. } => self.close(),
            XmlEvent::Text(text) => {
                match self.stack.last_mut() {
                    Some(Frame::Issue(issue)) => issue.text.push_str(&text),
                    Some(Frame::Output { text: buf, .. }) => buf.push_str(&text),
                    _ => {}
                }
                Ok(())
            }
        }
    }

    fn open(&mut self, name: &str, attrs: &Attrs) -> Result<()> {
        let in_suite = matches!(self.stack.last(), Some(Frame::Suite(_)));
        let in_case = matches!(self.stack.last(), Some(Frame::Case(_)));

        let frame = match name {
            "testsuites" if self.stack.is_empty() => Frame::Suites,
            "testsuite" if self.stack.is_empty() || in_suite || self.top_is_suites() => {
                Frame::Suite(JUnitSuite::from_attrs(attrs))
            }
            "testcase" if in_suite => Frame::Case(JUnitCase::from_attrs(attrs)),
            "testcase" => {
                return Err(Error::parse(self.path, "<testcase> outside of a <testsuite>"));
            }
            "failure" | "error" if in_suite || in_case => Frame::Issue(JUnitIssue {
                kind: if name == "failure" {
                    IssueKind::Failure
                } else {
                    IssueKind::Error
                },
                message: attrs.string("message"),
                issue_type: attrs.string("type"),
                text: String::new(),
            }),
            "skipped" | "disabled" if in_suite || in_case => Frame::Skipped(JUnitSkip {
                message: attrs.string("message"),
            }),
            "system-out" if in_suite || in_case => Frame::Output {
                kind: OutputKind::Stdout,
                text: String::new(),
            },
            "system-err" if in_suite || in_case => Frame::Output {
                kind: OutputKind::Stderr,
                text: String::new(),
            },
            "properties" if in_suite => Frame::Properties,
            "property" if matches!(self.stack.last(), Some(Frame::Properties)) => {
                if let (Some(key), Some(suite)) = (attrs.string("name"), self.nearest_suite()) {
                    let value = attrs.get("value").unwrap_or_default().to_string();
                    suite.properties.push((key, value));
                }
                Frame::Ignored
            }
            _ => Frame::Ignored,
        };
        self.stack.push(frame);
        Ok(())
    }

    fn top_is_suites(&self) -> bool {
        matches!(self.stack.last(), Some(Frame::Suites))
    }

    fn nearest_suite(&mut self) -> Option<&mut JUnitSuite> {
        self.stack.iter_mut().rev().find_map(|f| match f {
            Frame::Suite(s) => Some(s),
            _ => None,
        })
    }

    fn close(&mut self) -> Result<()> {
        let frame = self
            .stack
            .pop()
            .ok_or_else(|| Error::parse(self.path, "unbalanced closing tag"))?;

        match frame {
            Frame::Suite(suite) => {
                suite.validate(self.path)?;
                match self.stack.last_mut() {
                    Some(Frame::Suite(parent)) => parent.suites.push(suite),
                    _ => self.report.suites.push(suite),
                }
            }
            Frame::Case(case) => {
                if let Some(Frame::Suite(parent)) = self.stack.last_mut() {
                    parent.cases.push(case);
                }
            }
            Frame::Issue(issue) => match self.stack.last_mut() {
                Some(Frame::Suite(parent)) => match issue.kind {
                    IssueKind::Failure => parent.failures.push(issue),
                    IssueKind::Error => parent.errors.push(issue),
                },
                Some(Frame::Case(parent)) => match issue.kind {
                    IssueKind::Failure => parent.failures.push(issue),
                    IssueKind::Error => parent.errors.push(issue),
                },
                _ => {}
            },
            Frame::Skipped(skip) => match self.stack.last_mut() {
                Some(Frame::Suite(parent)) => parent.skipped = Some(skip),
                Some(Frame::Case(parent)) => parent.skipped = Some(skip),
                _ => {}
            },
            Frame::Output { kind, text } => {
                let slot = match self.stack.last_mut() {
                    Some(Frame::Suite(parent)) => match kind {
                        OutputKind::Stdout => &mut parent.system_out,
                        OutputKind::Stderr => &mut parent.system_err,
                    },
                    Some(Frame::Case(parent)) => match kind {
                        OutputKind::Stdout => &mut parent.system_out,
                        OutputKind::Stderr => &mut parent.system_err,
                    },
                    _ => return Ok(()),
                };
                let text = text.trim();
                if !text.is_empty() {
                    let merged = match slot.take() {
                        Some(mut existing) => {
                            existing.push('\n');
                            existing.push_str(text);
                            existing
                        }
                        None => text.to_string(),
                    };
                    *slot = Some(merged);
                }
            }
            Frame::Suites | Frame::Properties | Frame::Ignored => {}
        }
        Ok(())
    }
}

/// Parse JUnit XML content.
pub fn parse_junit_str(content: &str, path: &Path) -> Result<JUnitReport> {
    let mut builder = JUnitBuilder::new(path);
    read_events(content, path, |event| builder.handle(event))?;
    Ok(builder.report)
}

/// Parser for JUnit XML reports.
#[derive(Debug, Default, Clone, Copy)]
pub struct JUnitParser;

impl JUnitParser {
    pub fn new() -> Self {
        Self
    }
}

impl ReportParser for JUnitParser {
    fn parse_str(&self, content: &str, path: &Path) -> Result<ParsedReport> {
        parse_junit_str(content, path).map(ParsedReport::JUnit)
    }

    fn format(&self) -> ReportFormat {
        ReportFormat::JUnit
    }

    fn name(&self) -> &str {
        "JUnit"
    }
}
