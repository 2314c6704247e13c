//! TestNG `testng-results.xml` parser.

use std::path::Path;

use super::xml::{Attrs, XmlEvent, read_events};
use super::{ParsedReport, ReportFormat, ReportParser};
use crate::core::error::{Error, Result};
use crate::model::ExecutionStatus;

/// Contents of one TestNG results file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TestNgReport {
    pub total: Option<u32>,
    pub passed: Option<u32>,
    pub failed: Option<u32>,
    pub skipped: Option<u32>,
    pub suites: Vec<TestNgSuite>,
}

/// A `<suite>` element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TestNgSuite {
    pub name: String,
    pub duration_ms: Option<u64>,
    pub started_at: Option<String>,
    pub finished_at: Option<String>,
    pub tests: Vec<TestNgTest>,
}

impl TestNgSuite {
    /// Every class of every `<test>` in the suite.
    pub fn classes(&self) -> impl Iterator<Item = &TestNgClass> {
        self.tests.iter().flat_map(|t| t.classes.iter())
    }

    /// Failed as soon as one non-config method did not pass.
    pub fn status(&self) -> ExecutionStatus {
        if self.classes().any(TestNgClass::has_failing_method) {
            ExecutionStatus::Failed
        } else {
            ExecutionStatus::Passed
        }
    }
}

/// A `<test>` element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TestNgTest {
    pub name: String,
    pub duration_ms: Option<u64>,
    pub started_at: Option<String>,
    pub finished_at: Option<String>,
    pub classes: Vec<TestNgClass>,
}

/// A `<class>` element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TestNgClass {
    pub name: String,
    pub methods: Vec<TestNgMethod>,
}

impl TestNgClass {
    fn has_failing_method(&self) -> bool {
        self.methods
            .iter()
            .any(|m| !m.is_config && m.status != TestNgStatus::Pass)
    }

    /// Failed as soon as one non-config method did not pass.
    pub fn status(&self) -> ExecutionStatus {
        if self.has_failing_method() {
            ExecutionStatus::Failed
        } else {
            ExecutionStatus::Passed
        }
    }

    /// Test methods, excluding setup/teardown.
    pub fn test_methods(&self) -> impl Iterator<Item = &TestNgMethod> {
        self.methods.iter().filter(|m| !m.is_config)
    }
}

/// The `status` attribute of a `<test-method>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestNgStatus {
    Pass,
    Fail,
    Skip,
    Other(String),
}

impl TestNgStatus {
    fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "PASS" => TestNgStatus::Pass,
            "FAIL" => TestNgStatus::Fail,
            "SKIP" => TestNgStatus::Skip,
            _ => TestNgStatus::Other(raw.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            TestNgStatus::Pass => "PASS",
            TestNgStatus::Fail => "FAIL",
            TestNgStatus::Skip => "SKIP",
            TestNgStatus::Other(s) => s,
        }
    }
}

/// A `<test-method>` element.
#[derive(Debug, Clone, PartialEq)]
pub struct TestNgMethod {
    pub name: String,
    pub signature: Option<String>,
    pub status: TestNgStatus,
    pub is_config: bool,
    pub description: Option<String>,
    pub duration_ms: Option<u64>,
    pub started_at: Option<String>,
    pub finished_at: Option<String>,
    pub params: Vec<String>,
    pub exception: Option<TestNgException>,
}

impl TestNgMethod {
    fn from_attrs(attrs: &Attrs) -> Self {
        Self {
            name: attrs.string("name").unwrap_or_default(),
            signature: attrs.string("signature"),
            status: TestNgStatus::parse(attrs.get("status").unwrap_or_default()),
            is_config: attrs.bool("is-config"),
            description: attrs.string("description"),
            duration_ms: attrs.u64("duration-ms"),
            started_at: attrs.string("started-at"),
            finished_at: attrs.string("finished-at"),
            params: Vec::new(),
            exception: None,
        }
    }
}

/// An `<exception>` recorded for a method.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TestNgException {
    pub class: Option<String>,
    pub message: Option<String>,
    pub full_stacktrace: Option<String>,
}

/// One open element and the node it is building.
enum Frame {
    Results,
    Suite(TestNgSuite),
    Test(TestNgTest),
    Class(TestNgClass),
    Method(TestNgMethod),
    Exception(TestNgException),
    Message(String),
    StackTrace(String),
    Params(Vec<String>),
    Param(Option<String>),
    Value(String),
    Ignored,
}

struct TestNgBuilder<'p> {
    path: &'p Path,
    stack: Vec<Frame>,
    report: TestNgReport,
}

impl<'p> TestNgBuilder<'p> {
    fn new(path: &'p Path) -> Self {
        Self {
            path,
            stack: Vec::new(),
            report: TestNgReport::default(),
        }
    }

    fn handle(&mut self, event: XmlEvent) -> Result<()> {
        match event {
            XmlEvent::Open { name, attrs } => {
                let frame = self.open(&name, &attrs)?;
                self.stack.push(frame);
                Ok(())
            }
            XmlEvent::Close { .. } => self.close(),
            XmlEvent::Text(text) => {
                match self.stack.last_mut() {
                    Some(Frame::Message(buf))
                    | Some(Frame::StackTrace(buf))
                    | Some(Frame::Value(buf)) => buf.push_str(&text),
                    _ => {}
                }
                Ok(())
            }
        }
    }

    fn open(&mut self, name: &str, attrs: &Attrs) -> Result<Frame> {
        let frame = match (name, self.stack.last()) {
            ("testng-results", None) => {
                self.report.total = attrs.u32("total");
                self.report.passed = attrs.u32("passed");
                self.report.failed = attrs.u32("failed");
                self.report.skipped = attrs.u32("skipped");
                Frame::Results
            }
            ("suite", None) | ("suite", Some(Frame::Results)) => Frame::Suite(TestNgSuite {
                name: attrs.string("name").unwrap_or_default(),
                duration_ms: attrs.u64("duration-ms"),
                started_at: attrs.string("started-at"),
                finished_at: attrs.string("finished-at"),
                tests: Vec::new(),
            }),
            ("test", Some(Frame::Suite(_))) => Frame::Test(TestNgTest {
                name: attrs.string("name").unwrap_or_default(),
                duration_ms: attrs.u64("duration-ms"),
                started_at: attrs.string("started-at"),
                finished_at: attrs.string("finished-at"),
                classes: Vec::new(),
            }),
            ("class", Some(Frame::Test(_))) => Frame::Class(TestNgClass {
                name: attrs.string("name").unwrap_or_default(),
                methods: Vec::new(),
            }),
            ("test-method", Some(Frame::Class(_))) => {
                Frame::Method(TestNgMethod::from_attrs(attrs))
            }
            ("test-method", _) => {
                return Err(Error::parse(self.path, "<test-method> outside of a <class>"));
            }
            ("exception", Some(Frame::Method(_))) => Frame::Exception(TestNgException {
                class: attrs.string("class"),
                ..Default::default()
            }),
            ("message", Some(Frame::Exception(_))) => Frame::Message(String::new()),
            ("full-stacktrace", Some(Frame::Exception(_))) => Frame::StackTrace(String::new()),
            ("params", Some(Frame::Method(_))) => Frame::Params(Vec::new()),
            ("param", Some(Frame::Params(_))) => Frame::Param(None),
            ("value", Some(Frame::Param(_))) => Frame::Value(String::new()),
            _ => Frame::Ignored,
        };
        Ok(frame)
    }

    fn close(&mut self) -> Result<()> {
        let frame = self
            .stack
            .pop()
            .ok_or_else(|| Error::parse(self.path, "unbalanced closing tag"))?;

        match (frame, self.stack.last_mut()) {
            (Frame::Suite(suite), _) => self.report.suites.push(suite),
            (Frame::Test(test), Some(Frame::Suite(suite))) => suite.tests.push(test),
            (Frame::Class(class), Some(Frame::Test(test))) => test.classes.push(class),
            (Frame::Method(method), Some(Frame::Class(class))) => class.methods.push(method),
            (Frame::Exception(exception), Some(Frame::Method(method))) => {
                method.exception = Some(exception)
            }
            (Frame::Message(text), Some(Frame::Exception(exception))) => {
                exception.message = non_blank(text)
            }
            (Frame::StackTrace(text), Some(Frame::Exception(exception))) => {
                exception.full_stacktrace = non_blank(text)
            }
            (Frame::Value(text), Some(Frame::Param(slot))) => *slot = Some(text.trim().to_string()),
            (Frame::Param(value), Some(Frame::Params(values))) => values.extend(value),
            (Frame::Params(values), Some(Frame::Method(method))) => method.params = values,
            _ => {}
        }
        Ok(())
    }
}

fn non_blank(text: String) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Parse TestNG results XML content.
pub fn parse_testng_str(content: &str, path: &Path) -> Result<TestNgReport> {
    let mut builder = TestNgBuilder::new(path);
    read_events(content, path, |event| builder.handle(event))?;
    Ok(builder.report)
}

/// Parser for TestNG results files.
#[derive(Debug, Default, Clone, Copy)]
pub struct TestNgParser;

impl TestNgParser {
    pub fn new() -> Self {
        Self
    }
}

impl ReportParser for TestNgParser {
    fn parse_str(&self, content: &str, path: &Path) -> Result<ParsedReport> {
        parse_testng_str(content, path).map(ParsedReport::TestNg)
    }

    fn format(&self) -> ReportFormat {
        ReportFormat::TestNg
    }

    fn name(&self) -> &str {
        "TestNG"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<testng-results skipped="0" failed="1" total="3" passed="2">
  <reporter-output/>
  <suite name="Regression" duration-ms="120"
         started-at="2024-03-01T10:00:00Z" finished-at="2024-03-01T10:00:01Z">
    <groups/>
    <test name="Smoke" duration-ms="100">
      <class name="com.acme.CartTest">
        <test-method status="FAIL" signature="init()" name="init" is-config="true" duration-ms="2"/>
        <test-method status="PASS" signature="addItem()" name="addItem" duration-ms="40">
          <params>
            <param index="0"><value><![CDATA[apple]]></value></param>
          </params>
        </test-method>
      </class>
      <class name="com.acme.PayTest">
        <test-method status="FAIL" signature="pay()" name="pay" duration-ms="58" description="pays">
          <exception class="java.lang.AssertionError">
            <message><![CDATA[expected 200 but was 500]]></message>
            <full-stacktrace><![CDATA[java.lang.AssertionError: expected 200
  at com.acme.PayTest.pay]]></full-stacktrace>
          </exception>
        </test-method>
      </class>
    </test>
  </suite>
</testng-results>"#;

    fn parse(xml: &str) -> Result<TestNgReport> {
        parse_testng_str(xml, Path::new("testng-results.xml"))
    }

    #[test]
    fn test_parse_hierarchy() {
        let report = parse(SAMPLE).unwrap();
        assert_eq!(report.total, Some(3));
        assert_eq!(report.suites.len(), 1);
        let suite = &report.suites[0];
        assert_eq!(suite.name, "Regression");
        assert_eq!(suite.duration_ms, Some(120));
        assert_eq!(suite.tests[0].name, "Smoke");
        let classes: Vec<&str> = suite.classes().map(|c| c.name.as_str()).collect();
        assert_eq!(classes, vec!["com.acme.CartTest", "com.acme.PayTest"]);
    }

    #[test]
    fn test_parse_method_details() {
        let report = parse(SAMPLE).unwrap();
        let cart = &report.suites[0].tests[0].classes[0];
        assert!(cart.methods[0].is_config);
        assert_eq!(cart.methods[0].status, TestNgStatus::Fail);
        assert_eq!(cart.methods[1].params, vec!["apple"]);

        let pay = &report.suites[0].tests[0].classes[1].methods[0];
        let exception = pay.exception.as_ref().unwrap();
        assert_eq!(exception.class.as_deref(), Some("java.lang.AssertionError"));
        assert_eq!(exception.message.as_deref(), Some("expected 200 but was 500"));
        assert!(exception.full_stacktrace.as_deref().unwrap().contains("PayTest.pay"));
        assert_eq!(pay.description.as_deref(), Some("pays"));
    }

    #[test]
    fn test_config_method_failure_does_not_fail_class() {
        let report = parse(SAMPLE).unwrap();
        let cart = &report.suites[0].tests[0].classes[0];
        assert_eq!(cart.status(), ExecutionStatus::Passed);
        assert_eq!(cart.test_methods().count(), 1);
    }

    #[test]
    fn test_failing_method_fails_class_and_suite() {
        let report = parse(SAMPLE).unwrap();
        let pay = &report.suites[0].tests[0].classes[1];
        assert_eq!(pay.status(), ExecutionStatus::Failed);
        assert_eq!(report.suites[0].status(), ExecutionStatus::Failed);
    }

    #[test]
    fn test_skip_counts_as_not_pass() {
        let report = parse(
            r#"<testng-results><suite name="s"><test name="t"><class name="C">
<test-method status="SKIP" name="m"/>
</class></test></suite></testng-results>"#,
        )
        .unwrap();
        assert_eq!(report.suites[0].status(), ExecutionStatus::Failed);
    }

    #[test]
    fn test_bare_suite_root_is_accepted() {
        let report =
            parse(r#"<suite name="s"><test name="t"><class name="C"/></test></suite>"#).unwrap();
        assert_eq!(report.suites[0].status(), ExecutionStatus::Passed);
    }

    #[test]
    fn test_method_outside_class_is_parse_error() {
        let err = parse(r#"<testng-results><test-method name="m"/></testng-results>"#).unwrap_err();
        assert!(err.is_parse_error());
    }

    #[test]
    fn test_unknown_status_is_preserved() {
        assert_eq!(TestNgStatus::parse("pass"), TestNgStatus::Pass);
        assert_eq!(
            TestNgStatus::parse("SUCCESS_PERCENTAGE_FAILURE"),
            TestNgStatus::Other("SUCCESS_PERCENTAGE_FAILURE".to_string())
        );
    }
}
