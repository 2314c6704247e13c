//! Configuration types and loading from a standalone TOML file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::error::{Error, Result};
use crate::report::ReportFormat;

pub mod env;
mod loader;
pub use loader::ConfigLoader;

/// Complete reconciler configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// Directory the include patterns are evaluated against.
    #[serde(default = "default_base_dir")]
    pub base_dir: PathBuf,

    /// Custom field holding the match keys, unless a seeker overrides it.
    #[serde(default = "default_key_field")]
    pub key_field: String,

    /// Generate descriptive notes for each match.
    #[serde(default = "default_true")]
    pub include_notes: bool,

    /// Report skipped units as blocked instead of leaving them out.
    #[serde(default)]
    pub mark_skipped_as_blocked: bool,

    /// Result seekers, run in order.
    #[serde(default)]
    pub seekers: Vec<SeekerConfig>,

    /// TAP-specific options.
    #[serde(default)]
    pub tap: TapConfig,

    /// Where executions are reported.
    #[serde(default)]
    pub dispatch: DispatchConfig,

    /// Enable verbose output.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
            key_field: default_key_field(),
            include_notes: true,
            mark_skipped_as_blocked: false,
            seekers: Vec::new(),
            tap: TapConfig::default(),
            dispatch: DispatchConfig::default(),
            verbose: false,
        }
    }
}

impl Config {
    /// Parse a configuration from TOML text. `[profiles]` tables are ignored.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML configuration file.
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        Self::from_toml_str(&std::fs::read_to_string(path)?)
    }

    /// Reject settings that can never match anything.
    pub fn validate(&self) -> Result<()> {
        if self.key_field.trim().is_empty() {
            return Err(Error::InvalidConfig {
                field: "key-field".to_string(),
                value: self.key_field.clone(),
            });
        }
        for seeker in &self.seekers {
            if let Some(ref field) = seeker.key_field {
                if field.trim().is_empty() {
                    return Err(Error::InvalidConfig {
                        field: format!("seekers.{}.key-field", seeker.kind),
                        value: field.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Key field used by a seeker.
    pub fn key_field_for<'a>(&'a self, seeker: &'a SeekerConfig) -> &'a str {
        seeker.key_field.as_deref().unwrap_or(&self.key_field)
    }
}

fn default_base_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_key_field() -> String {
    "Java Class".to_string()
}

fn default_true() -> bool {
    true
}

/// One configured result seeker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SeekerConfig {
    pub kind: SeekerKind,

    /// Comma-separated Ant-style include patterns.
    pub include: String,

    /// Overrides the top-level key field.
    #[serde(default)]
    pub key_field: Option<String>,

    /// Attach the matched report file to each match.
    #[serde(default)]
    pub attach_report: bool,
}

impl SeekerConfig {
    pub fn new(kind: SeekerKind, include: impl Into<String>) -> Self {
        Self {
            kind,
            include: include.into(),
            key_field: None,
            attach_report: false,
        }
    }
}

/// What a seeker compares against the match keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SeekerKind {
    /// JUnit suite name.
    JunitSuiteName,
    /// JUnit test case name.
    JunitCaseName,
    /// JUnit test case `classname`.
    JunitClassName,
    /// JUnit `classname.name`.
    JunitMethodName,
    /// TestNG suite name.
    TestngSuiteName,
    /// TestNG class name.
    TestngClassName,
    /// TestNG `class#method`.
    TestngMethodName,
    /// TAP file name without extension.
    TapFileName,
}

impl SeekerKind {
    pub const ALL: [SeekerKind; 8] = [
        SeekerKind::JunitSuiteName,
        SeekerKind::JunitCaseName,
        SeekerKind::JunitClassName,
        SeekerKind::JunitMethodName,
        SeekerKind::TestngSuiteName,
        SeekerKind::TestngClassName,
        SeekerKind::TestngMethodName,
        SeekerKind::TapFileName,
    ];

    /// Report format the seeker reads.
    pub fn format(self) -> ReportFormat {
        match self {
            SeekerKind::JunitSuiteName
            | SeekerKind::JunitCaseName
            | SeekerKind::JunitClassName
            | SeekerKind::JunitMethodName => ReportFormat::JUnit,
            SeekerKind::TestngSuiteName
            | SeekerKind::TestngClassName
            | SeekerKind::TestngMethodName => ReportFormat::TestNg,
            SeekerKind::TapFileName => ReportFormat::Tap,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SeekerKind::JunitSuiteName => "junit-suite-name",
            SeekerKind::JunitCaseName => "junit-case-name",
            SeekerKind::JunitClassName => "junit-class-name",
            SeekerKind::JunitMethodName => "junit-method-name",
            SeekerKind::TestngSuiteName => "testng-suite-name",
            SeekerKind::TestngClassName => "testng-class-name",
            SeekerKind::TestngMethodName => "testng-method-name",
            SeekerKind::TapFileName => "tap-file-name",
        }
    }
}

impl std::fmt::Display for SeekerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// TAP configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TapConfig {
    /// Compare the relative path (without extension) instead of the file stem.
    #[serde(default)]
    pub compare_full_path: bool,

    /// Extract files embedded in YAMLish diagnostics.
    #[serde(default = "default_true")]
    pub attach_yamlish_attachments: bool,
}

impl Default for TapConfig {
    fn default() -> Self {
        Self {
            compare_full_path: false,
            attach_yamlish_attachments: true,
        }
    }
}

/// Target of the executions reported after a scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DispatchConfig {
    pub plan_id: Option<u32>,
    pub build_id: Option<u32>,
    pub build_name: Option<String>,
    pub platform: Option<String>,
}
