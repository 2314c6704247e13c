//! Report parsers (JUnit, TestNG, TAP) behind one trait.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::error::{Error, Result};

pub mod junit;
pub mod tap;
pub mod testng;
mod xml;

pub use junit::{JUnitCase, JUnitParser, JUnitReport, JUnitSuite};
pub use tap::{TapParser, TapTestSet};
pub use testng::{TestNgParser, TestNgReport};

/// Supported report formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportFormat {
    #[serde(rename = "junit")]
    JUnit,
    #[serde(rename = "testng")]
    TestNg,
    Tap,
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportFormat::JUnit => write!(f, "junit"),
            ReportFormat::TestNg => write!(f, "testng"),
            ReportFormat::Tap => write!(f, "tap"),
        }
    }
}

/// A parsed report of any supported format.
#[derive(Debug, Clone)]
pub enum ParsedReport {
    JUnit(JUnitReport),
    TestNg(TestNgReport),
    Tap(TapTestSet),
}

impl ParsedReport {
    pub fn format(&self) -> ReportFormat {
        match self {
            ParsedReport::JUnit(_) => ReportFormat::JUnit,
            ParsedReport::TestNg(_) => ReportFormat::TestNg,
            ParsedReport::Tap(_) => ReportFormat::Tap,
        }
    }
}

/// Parser for one report format.
pub trait ReportParser: Send + Sync {
    /// Parse report content. `path` is only used for error messages.
    fn parse_str(&self, content: &str, path: &Path) -> Result<ParsedReport>;

    /// Read and parse a report file.
    fn parse(&self, path: &Path) -> Result<ParsedReport> {
        if !path.is_file() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        self.parse_str(&content, path)
    }

    /// Format this parser understands.
    fn format(&self) -> ReportFormat;

    /// Get a human-readable name for this parser.
    fn name(&self) -> &str;
}

/// Create the parser for a format.
pub fn parser_for(format: ReportFormat) -> Result<Box<dyn ReportParser>> {
    Ok(match format {
        ReportFormat::JUnit => Box::new(JUnitParser),
        ReportFormat::TestNg => Box::new(TestNgParser),
        ReportFormat::Tap => Box::new(TapParser::new()?),
    })
}
