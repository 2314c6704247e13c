//! TAP13 stream parser.
//!
//! Line oriented: each line is classified with a regex, as the output
//! harness does, while an explicit [`LineState`] tracks whether the parser
//! is inside a YAMLish diagnostic block.

use regex::Regex;
use serde_yaml::Value;
use std::path::Path;

use super::{ParsedReport, ReportFormat, ReportParser};
use crate::core::error::{Error, Result};
use crate::model::ExecutionStatus;

/// One TAP stream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TapTestSet {
    pub version: Option<u32>,
    pub plan: Option<TapPlan>,
    pub results: Vec<TapResult>,
    pub bail_out: Option<TapBailOut>,
    pub comments: Vec<String>,
}

impl TapTestSet {
    /// Blocked when anything was skipped, failed on a `not ok`, a bail-out or
    /// a `TODO`, passed otherwise. Skip wins over failure.
    pub fn status(&self) -> ExecutionStatus {
        let plan_skipped = self.plan.as_ref().is_some_and(|p| p.skip.is_some());
        if plan_skipped || self.results.iter().any(|r| r.has_directive(DirectiveKind::Skip)) {
            return ExecutionStatus::Blocked;
        }
        let failed = self.bail_out.is_some()
            || self
                .results
                .iter()
                .any(|r| !r.ok || r.has_directive(DirectiveKind::Todo));
        if failed {
            ExecutionStatus::Failed
        } else {
            ExecutionStatus::Passed
        }
    }

    /// Files embedded in diagnostic blocks under `extensions.Files`.
    pub fn embedded_files(&self) -> Vec<EmbeddedFile> {
        self.results
            .iter()
            .filter_map(|r| r.diagnostic.as_ref())
            .flat_map(embedded_files_in)
            .collect()
    }
}

/// The `1..N` plan line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TapPlan {
    pub first: u32,
    pub last: u32,
    /// Reason given by a `# SKIP` directive on the plan.
    pub skip: Option<String>,
}

/// An `ok` / `not ok` line with its optional diagnostic block.
#[derive(Debug, Clone, PartialEq)]
pub struct TapResult {
    pub number: Option<u32>,
    pub ok: bool,
    pub description: String,
    pub directive: Option<TapDirective>,
    pub diagnostic: Option<Value>,
}

impl TapResult {
    fn has_directive(&self, kind: DirectiveKind) -> bool {
        self.directive.as_ref().is_some_and(|d| d.kind == kind)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveKind {
    Skip,
    Todo,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TapDirective {
    pub kind: DirectiveKind,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TapBailOut {
    pub reason: String,
}

/// A file described inside a diagnostic block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmbeddedFile {
    /// Entry key under `Files` (or its position for a list).
    pub key: String,
    pub name: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub file_type: Option<String>,
    pub size: Option<u64>,
    /// Inline base64 content.
    pub content: Option<String>,
    /// Path to read the content from when it is not inline.
    pub location: Option<String>,
}

fn yaml_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn embedded_file(key: String, entry: &Value) -> Option<EmbeddedFile> {
    let map = entry.as_mapping()?;
    let field = |name: &str| map.get(name).and_then(yaml_string);
    Some(EmbeddedFile {
        key,
        name: field("File-Name"),
        title: field("File-Title"),
        description: field("File-Description"),
        file_type: field("File-Type"),
        size: field("File-Size").and_then(|s| s.parse().ok()),
        content: field("File-Content"),
        location: field("File-Location"),
    })
}

fn embedded_files_in(diagnostic: &Value) -> Vec<EmbeddedFile> {
    let files = diagnostic.get("extensions").and_then(|ext| ext.get("Files"));
    match files {
        Some(Value::Mapping(map)) => map
            .iter()
            .filter_map(|(k, v)| embedded_file(yaml_string(k).unwrap_or_default(), v))
            .collect(),
        Some(Value::Sequence(seq)) => seq
            .iter()
            .enumerate()
            .filter_map(|(i, v)| embedded_file(i.to_string(), v))
            .collect(),
        _ => Vec::new(),
    }
}

/// Where the line reader currently is.
enum LineState {
    Stream,
    Diagnostic {
        indent: usize,
        start_line: usize,
        lines: Vec<String>,
    },
}

/// Parser for TAP streams.
pub struct TapParser {
    version: Regex,
    plan: Regex,
    result: Regex,
    directive: Regex,
    bail_out: Regex,
    yaml_start: Regex,
}

impl TapParser {
    /// Create a new TAP parser.
    pub fn new() -> Result<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern)
                .map_err(|e| Error::config(format!("invalid TAP pattern '{}': {}", pattern, e)))
        };
        Ok(Self {
            version: compile(r"(?i)^TAP version (\d+)\s*$")?,
            plan: compile(r"^(\d+)\.\.(\d+)\s*(?:#\s*(.*))?$")?,
            result: compile(r"^(not ok|ok)\b\s*(\d+)?\s*(?:-\s*)?([^#]*?)\s*(?:#\s*(.*))?$")?,
            directive: compile(r"(?i)^(skip|todo)\S*\s*(.*)$")?,
            bail_out: compile(r"(?i)^Bail out!\s*(.*)$")?,
            yaml_start: compile(r"^(\s+)---\s*$")?,
        })
    }

    fn directive(&self, comment: Option<&str>) -> Option<TapDirective> {
        let caps = self.directive.captures(comment?.trim())?;
        let kind = if caps[1].eq_ignore_ascii_case("skip") {
            DirectiveKind::Skip
        } else {
            DirectiveKind::Todo
        };
        Some(TapDirective {
            kind,
            reason: caps.get(2).map(|m| m.as_str().trim().to_string()).unwrap_or_default(),
        })
    }

    /// Parse TAP stream content.
    pub fn parse_tap_str(&self, content: &str, path: &Path) -> Result<TapTestSet> {
        let mut set = TapTestSet::default();
        let mut state = LineState::Stream;

        for (idx, raw) in content.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.trim_end_matches('\r');

            state = match state {
                LineState::Diagnostic {
                    indent,
                    start_line,
                    mut lines,
                } => {
                    if line.trim() == "..." {
                        let diagnostic = parse_yamlish(&lines, indent, start_line, path)?;
                        if let Some(last) = set.results.last_mut() {
                            last.diagnostic = Some(diagnostic);
                        }
                        LineState::Stream
                    } else {
                        lines.push(line.to_string());
                        LineState::Diagnostic {
                            indent,
                            start_line,
                            lines,
                        }
                    }
                }
                LineState::Stream => {
                    if let Some(caps) = self.yaml_start.captures(line) {
                        LineState::Diagnostic {
                            indent: caps[1].len(),
                            start_line: line_no,
                            lines: Vec::new(),
                        }
                    } else {
                        self.parse_line(line, &mut set);
                        LineState::Stream
                    }
                }
            };
        }

        if let LineState::Diagnostic { start_line, .. } = state {
            return Err(Error::parse(
                path,
                format!("unterminated YAMLish block starting at line {}", start_line),
            ));
        }

        if set.plan.is_none() && set.results.is_empty() && set.bail_out.is_none() {
            return Err(Error::parse(path, "no TAP plan, test result or bail-out found"));
        }

        Ok(set)
    }

    fn parse_line(&self, line: &str, set: &mut TapTestSet) {
        if let Some(caps) = self.result.captures(line) {
            let comment = caps.get(4).map(|m| m.as_str());
            set.results.push(TapResult {
                number: caps.get(2).and_then(|m| m.as_str().parse().ok()),
                ok: &caps[1] == "ok",
                description: caps.get(3).map(|m| m.as_str().trim().to_string()).unwrap_or_default(),
                directive: self.directive(comment),
                diagnostic: None,
            });
        } else if let Some(caps) = self.plan.captures(line) {
            let skip = self
                .directive(caps.get(3).map(|m| m.as_str()))
                .filter(|d| d.kind == DirectiveKind::Skip)
                .map(|d| d.reason);
            set.plan = Some(TapPlan {
                first: caps[1].parse().unwrap_or(1),
                last: caps[2].parse().unwrap_or(0),
                skip,
            });
        } else if let Some(caps) = self.bail_out.captures(line) {
            set.bail_out = Some(TapBailOut {
                reason: caps[1].trim().to_string(),
            });
        } else if let Some(caps) = self.version.captures(line) {
            set.version = caps[1].parse().ok();
        } else if let Some(comment) = line.strip_prefix('#') {
            set.comments.push(comment.trim().to_string());
        }
        // Anything else (including indented subtest output) is ignored.
    }
}

fn parse_yamlish(
    lines: &[String],
    indent: usize,
    start_line: usize,
    path: &Path,
) -> Result<Value> {
    let body: Vec<&str> = lines
        .iter()
        .map(|l| {
            // Only ASCII indentation is stripped so the cut stays on a char boundary.
            let strip = l.len() - l.trim_start_matches([' ', '\t']).len();
            &l[strip.min(indent)..]
        })
        .collect();
    serde_yaml::from_str(&body.join("\n")).map_err(|e| {
        Error::parse(
            path,
            format!("invalid YAMLish block starting at line {}: {}", start_line, e),
        )
    })
}

impl ReportParser for TapParser {
    fn parse_str(&self, content: &str, path: &Path) -> Result<ParsedReport> {
        self.parse_tap_str(content, path).map(ParsedReport::Tap)
    }

    fn format(&self) -> ReportFormat {
        ReportFormat::Tap
    }

    fn name(&self) -> &str {
        "TAP"
    }
}
