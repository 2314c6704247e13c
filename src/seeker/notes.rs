//! Human-readable execution notes for each kind of match.

use std::fmt::Write;

use crate::report::junit::{IssueKind, JUnitCase, JUnitIssue, JUnitSuite};
use crate::report::tap::TapTestSet;
use crate::report::testng::{TestNgClass, TestNgMethod, TestNgSuite};

// Writing into a String cannot fail, so the fmt results are dropped.

fn line(out: &mut String, label: &str, value: impl std::fmt::Display) {
    let _ = writeln!(out, "{}: {}", label, value);
}

fn optional(out: &mut String, label: &str, value: Option<&str>) {
    if let Some(value) = value {
        line(out, label, value);
    }
}

fn block(out: &mut String, label: &str, text: Option<&str>) {
    if let Some(text) = text.map(str::trim).filter(|t| !t.is_empty()) {
        let _ = writeln!(out, "{}:\n{}", label, text);
    }
}

fn issue(out: &mut String, issue: &JUnitIssue) {
    let label = match issue.kind {
        IssueKind::Failure => "Failure",
        IssueKind::Error => "Error",
    };
    let message = issue.message.as_deref().unwrap_or("");
    match issue.issue_type.as_deref() {
        Some(ty) => {
            let _ = writeln!(out, "{} ({}): {}", label, ty, message);
        }
        None => line(out, label, message),
    }
    block(out, "Details", Some(&issue.text));
}

fn finish(mut out: String) -> String {
    while out.ends_with('\n') {
        out.pop();
    }
    out
}

pub fn junit_suite(suite: &JUnitSuite) -> String {
    let mut out = String::new();
    line(&mut out, "JUnit suite", &suite.name);
    let skipped = suite.cases.iter().filter(|c| c.is_skipped()).count();
    let _ = writeln!(
        out,
        "Tests: {}, Failures: {}, Errors: {}, Skipped: {}",
        suite.declared_tests.unwrap_or(suite.cases.len() as u32),
        suite.failure_count(),
        suite.error_count(),
        suite.declared_skipped.unwrap_or(skipped as u32),
    );
    if let Some(time) = suite.time {
        line(&mut out, "Time", format!("{:.3}s", time));
    }
    optional(&mut out, "Timestamp", suite.timestamp.as_deref());
    optional(&mut out, "Hostname", suite.hostname.as_deref());
    for failure in suite.failures.iter().chain(&suite.errors) {
        issue(&mut out, failure);
    }
    block(&mut out, "System out", suite.system_out.as_deref());
    block(&mut out, "System err", suite.system_err.as_deref());
    finish(out)
}

pub fn junit_case(case: &JUnitCase) -> String {
    let mut out = String::new();
    line(&mut out, "JUnit test case", &case.name);
    optional(&mut out, "Class", case.classname.as_deref());
    if let Some(time) = case.time {
        line(&mut out, "Time", format!("{:.3}s", time));
    }
    if let Some(ref skip) = case.skipped {
        line(&mut out, "Skipped", skip.message.as_deref().unwrap_or("yes"));
    }
    for failure in case.failures.iter().chain(&case.errors) {
        issue(&mut out, failure);
    }
    block(&mut out, "System out", case.system_out.as_deref());
    block(&mut out, "System err", case.system_err.as_deref());
    finish(out)
}

fn timing(
    out: &mut String,
    started: Option<&str>,
    finished: Option<&str>,
    duration_ms: Option<u64>,
) {
    optional(out, "Started at", started);
    optional(out, "Finished at", finished);
    if let Some(ms) = duration_ms {
        line(out, "Duration", format!("{} ms", ms));
    }
}

fn method_summary(out: &mut String, method: &TestNgMethod) {
    let _ = writeln!(out, "  {} [{}]", method.name, method.status.as_str());
}

pub fn testng_suite(suite: &TestNgSuite) -> String {
    let mut out = String::new();
    line(&mut out, "TestNG suite", &suite.name);
    timing(
        &mut out,
        suite.started_at.as_deref(),
        suite.finished_at.as_deref(),
        suite.duration_ms,
    );
    for class in suite.classes() {
        let _ = writeln!(out, "Class {}:", class.name);
        for method in class.test_methods() {
            method_summary(&mut out, method);
        }
    }
    finish(out)
}

pub fn testng_class(class: &TestNgClass) -> String {
    let mut out = String::new();
    line(&mut out, "TestNG class", &class.name);
    out.push_str("Methods:\n");
    for method in class.test_methods() {
        method_summary(&mut out, method);
    }
    finish(out)
}

pub fn testng_method(class: &TestNgClass, method: &TestNgMethod) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "TestNG method: {}#{}", class.name, method.name);
    optional(&mut out, "Signature", method.signature.as_deref());
    optional(&mut out, "Description", method.description.as_deref());
    line(&mut out, "Status", method.status.as_str());
    timing(
        &mut out,
        method.started_at.as_deref(),
        method.finished_at.as_deref(),
        method.duration_ms,
    );
    if !method.params.is_empty() {
        line(&mut out, "Parameters", method.params.join(", "));
    }
    if let Some(ref exception) = method.exception {
        optional(&mut out, "Exception", exception.class.as_deref());
        optional(&mut out, "Message", exception.message.as_deref());
        block(&mut out, "Stack trace", exception.full_stacktrace.as_deref());
    }
    finish(out)
}

pub fn tap(set: &TapTestSet) -> String {
    let mut out = String::new();
    if let Some(version) = set.version {
        line(&mut out, "TAP version", version);
    }
    if let Some(ref plan) = set.plan {
        match plan.skip {
            Some(ref reason) => {
                let _ = writeln!(out, "Plan: {}..{} # SKIP {}", plan.first, plan.last, reason);
            }
            None => {
                let _ = writeln!(out, "Plan: {}..{}", plan.first, plan.last);
            }
        }
    }
    for result in &set.results {
        out.push_str(if result.ok { "ok" } else { "not ok" });
        if let Some(number) = result.number {
            let _ = write!(out, " {}", number);
        }
        if !result.description.is_empty() {
            let _ = write!(out, " - {}", result.description);
        }
        if let Some(ref directive) = result.directive {
            let kind = match directive.kind {
                crate::report::tap::DirectiveKind::Skip => "SKIP",
                crate::report::tap::DirectiveKind::Todo => "TODO",
            };
            let _ = write!(out, " # {} {}", kind, directive.reason);
        }
        out.push('\n');
    }
    if let Some(ref bail) = set.bail_out {
        line(&mut out, "Bail out!", &bail.reason);
    }
    finish(out)
}
