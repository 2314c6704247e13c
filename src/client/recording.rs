use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use super::{ExecutionRecord, TestManagementClient};
use crate::core::error::{Error, Result};
use crate::model::Attachment;

/// An execution accepted by a [`RecordingClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedExecution {
    pub execution_id: u64,
    pub record: ExecutionRecord,
}

/// An attachment accepted by a [`RecordingClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedUpload {
    pub execution_id: u64,
    pub attachment: Attachment,
}

#[derive(Debug, Default)]
struct State {
    next_id: u64,
    executions: Vec<RecordedExecution>,
    uploads: Vec<RecordedUpload>,
}

/// In-memory client that records every call.
///
/// Execution ids are assigned sequentially from 1. Failures can be injected
/// per test case or per attachment file name.
#[derive(Debug, Default)]
pub struct RecordingClient {
    state: Mutex<State>,
    failing_test_cases: HashSet<u32>,
    failing_attachments: HashSet<String>,
}

impl RecordingClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject executions reported for this test case id.
    pub fn fail_test_case(mut self, test_case_id: u32) -> Self {
        self.failing_test_cases.insert(test_case_id);
        self
    }

    /// Reject uploads of attachments with this file name.
    pub fn fail_attachment(mut self, file_name: impl Into<String>) -> Self {
        self.failing_attachments.insert(file_name.into());
        self
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn executions(&self) -> Vec<RecordedExecution> {
        self.state().executions.clone()
    }

    pub fn uploads(&self) -> Vec<RecordedUpload> {
        self.state().uploads.clone()
    }
}

impl TestManagementClient for RecordingClient {
    fn report_execution(&self, record: &ExecutionRecord) -> Result<u64> {
        if self.failing_test_cases.contains(&record.test_case_id) {
            return Err(Error::dispatch(format!(
                "execution for test case {} rejected",
                record.test_case_id
            )));
        }
        let mut state = self.state();
        state.next_id += 1;
        let execution_id = state.next_id;
        state.executions.push(RecordedExecution {
            execution_id,
            record: record.clone(),
        });
        Ok(execution_id)
    }

    fn upload_attachment(&self, execution_id: u64, attachment: &Attachment) -> Result<()> {
        if self.failing_attachments.contains(&attachment.file_name) {
            return Err(Error::dispatch(format!(
                "upload of '{}' rejected",
                attachment.file_name
            )));
        }
        let mut state = self.state();
        if !state.executions.iter().any(|e| e.execution_id == execution_id) {
            return Err(Error::dispatch(format!("unknown execution id {}", execution_id)));
        }
        state.uploads.push(RecordedUpload {
            execution_id,
            attachment: attachment.clone(),
        });
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }
}
