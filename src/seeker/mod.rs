//! Result seekers: turn a parsed report into match units keyed by the
//! identity string each seeker kind compares against catalog keys.

use indexmap::IndexMap;

use crate::config::SeekerKind;
use crate::core::context::{ReportFile, ScanContext};
use crate::core::error::{Error, Result};
use crate::model::{Attachment, ExecutionStatus};
use crate::report::{ParsedReport, ReportFormat};

mod index;
pub mod junit;
pub mod notes;
pub mod tap;
pub mod testng;

pub use index::KeyIndex;
pub use junit::JUnitSeeker;
pub use tap::TapSeeker;
pub use testng::TestNgSeeker;

/// One unit of a report that can match catalog test cases.
#[derive(Debug, Clone, PartialEq)]
pub struct SeekUnit {
    /// Identity compared against match keys.
    pub identity: String,
    pub status: ExecutionStatus,
    pub notes: String,
    pub attachments: Vec<Attachment>,
}

impl SeekUnit {
    pub fn new(identity: impl Into<String>, status: ExecutionStatus) -> Self {
        Self {
            identity: identity.into(),
            status,
            notes: String::new(),
            attachments: Vec::new(),
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }
}

/// Seeker trait: extracts match units from one parsed report.
pub trait ResultSeeker: Send + Sync {
    /// Which identity this seeker extracts.
    fn kind(&self) -> SeekerKind;

    /// Report format the seeker reads.
    fn format(&self) -> ReportFormat {
        self.kind().format()
    }

    /// Extract the units of one report. Units sharing an identity are
    /// coalesced by the caller.
    fn units(
        &self,
        ctx: &ScanContext,
        file: &ReportFile,
        report: &ParsedReport,
    ) -> Result<Vec<SeekUnit>>;

    /// Get a human-readable name for this seeker.
    fn name(&self) -> &str;
}

/// Create the seeker for a configured kind.
pub fn create_seeker(kind: SeekerKind) -> Box<dyn ResultSeeker> {
    match kind {
        SeekerKind::JunitSuiteName
        | SeekerKind::JunitCaseName
        | SeekerKind::JunitClassName
        | SeekerKind::JunitMethodName => Box::new(JUnitSeeker::new(kind)),
        SeekerKind::TestngSuiteName
        | SeekerKind::TestngClassName
        | SeekerKind::TestngMethodName => Box::new(TestNgSeeker::new(kind)),
        SeekerKind::TapFileName => Box::new(TapSeeker::new()),
    }
}

/// Merge units of one file that share an identity.
///
/// Statuses fold (failure first), notes are joined and attachments kept, so
/// two cases of the same class in one file never hide each other.
pub fn coalesce(units: Vec<SeekUnit>) -> Vec<SeekUnit> {
    let mut merged: IndexMap<String, SeekUnit> = IndexMap::new();
    for unit in units {
        match merged.get_mut(&unit.identity) {
            Some(existing) => {
                existing.status = ExecutionStatus::fold([existing.status, unit.status]);
                if !unit.notes.is_empty() {
                    if !existing.notes.is_empty() {
                        existing.notes.push('\n');
                    }
                    existing.notes.push_str(&unit.notes);
                }
                existing.attachments.extend(unit.attachments);
            }
            None => {
                merged.insert(unit.identity.clone(), unit);
            }
        }
    }
    merged.into_values().collect()
}

pub(crate) fn non_blank(value: &str) -> Option<String> {
    Some(value.trim()).filter(|v| !v.is_empty()).map(String::from)
}

/// `left<sep>right`, falling back to whichever side is present.
pub(crate) fn join_identity(left: Option<&str>, sep: char, right: &str) -> Option<String> {
    let left = left.map(str::trim).filter(|s| !s.is_empty());
    let right = Some(right.trim()).filter(|s| !s.is_empty());
    match (left, right) {
        (Some(l), Some(r)) => Some(format!("{}{}{}", l, sep, r)),
        (Some(one), None) | (None, Some(one)) => Some(one.to_string()),
        (None, None) => None,
    }
}

pub(crate) fn wrong_report(seeker: &dyn ResultSeeker, report: &ParsedReport) -> Error {
    Error::config(format!(
        "{} seeker cannot read {} reports",
        seeker.name(),
        report.format()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_seeker_for_every_kind() {
        for kind in SeekerKind::ALL {
            let seeker = create_seeker(kind);
            assert_eq!(seeker.kind(), kind);
            assert_eq!(seeker.format(), kind.format());
        }
    }

    #[test]
    fn test_coalesce_folds_same_identity() {
        let units = vec![
            SeekUnit::new("a.Login", ExecutionStatus::Failed).with_notes("first"),
            SeekUnit::new("a.Logout", ExecutionStatus::Passed),
            SeekUnit::new("a.Login", ExecutionStatus::Passed).with_notes("second"),
        ];
        let merged = coalesce(units);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].identity, "a.Login");
        assert_eq!(merged[0].status, ExecutionStatus::Failed);
        assert_eq!(merged[0].notes, "first\nsecond");
        assert_eq!(merged[1].identity, "a.Logout");
    }

    #[test]
    fn test_join_identity() {
        assert_eq!(join_identity(Some("a.B"), '.', "m"), Some("a.B.m".to_string()));
        assert_eq!(join_identity(Some(" "), '#', "m"), Some("m".to_string()));
        assert_eq!(join_identity(Some("a.B"), '#', ""), Some("a.B".to_string()));
        assert_eq!(join_identity(None, '#', " "), None);
    }
}
