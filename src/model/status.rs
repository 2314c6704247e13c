use serde::{Deserialize, Serialize};
use std::fmt;

/// Execution status of a catalog test case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ExecutionStatus {
    /// Not executed in this build.
    #[default]
    NotRun,
    /// Executed and passed.
    Passed,
    /// Executed and failed.
    Failed,
    /// Could not be executed. Catalog entries already blocked are left out of matching.
    Blocked,
}

impl ExecutionStatus {
    /// Single-letter code used by the test-management system.
    pub fn code(self) -> char {
        match self {
            ExecutionStatus::NotRun => 'n',
            ExecutionStatus::Passed => 'p',
            ExecutionStatus::Failed => 'f',
            ExecutionStatus::Blocked => 'b',
        }
    }

    /// Parse a single-letter status code.
    pub fn from_code(code: char) -> Option<Self> {
        match code.to_ascii_lowercase() {
            'n' => Some(ExecutionStatus::NotRun),
            'p' => Some(ExecutionStatus::Passed),
            'f' => Some(ExecutionStatus::Failed),
            'b' => Some(ExecutionStatus::Blocked),
            _ => None,
        }
    }

    /// Fold per-key statuses into one: any failure wins, then any pass, then
    /// any block. An empty input is `NotRun`.
    pub fn fold<I>(statuses: I) -> Self
    where
        I: IntoIterator<Item = ExecutionStatus>,
    {
        let mut passed = false;
        let mut blocked = false;
        for status in statuses {
            match status {
                ExecutionStatus::Failed => return ExecutionStatus::Failed,
                ExecutionStatus::Passed => passed = true,
                ExecutionStatus::Blocked => blocked = true,
                ExecutionStatus::NotRun => {}
            }
        }
        if passed {
            ExecutionStatus::Passed
        } else if blocked {
            ExecutionStatus::Blocked
        } else {
            ExecutionStatus::NotRun
        }
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExecutionStatus::NotRun => "not run",
            ExecutionStatus::Passed => "passed",
            ExecutionStatus::Failed => "failed",
            ExecutionStatus::Blocked => "blocked",
        };
        f.write_str(s)
    }
}
