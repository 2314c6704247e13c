//! Sends merged results to a [`TestManagementClient`].

use serde::Serialize;

use crate::client::{ExecutionRecord, TestManagementClient};
use crate::config::DispatchConfig;
use crate::merge::ResultWrapper;
use crate::model::ExecutionStatus;

/// One execution the client accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct DispatchedExecution {
    pub test_case_id: u32,
    pub execution_id: u64,
    pub status: ExecutionStatus,
    pub attachments_uploaded: usize,
}

/// One call the client rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct DispatchFailure {
    pub test_case_id: u32,
    /// File name of the attachment, or `None` when the execution itself failed.
    pub attachment: Option<String>,
    pub message: String,
}

/// Outcome of dispatching a whole scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    pub executions: Vec<DispatchedExecution>,
    pub failures: Vec<DispatchFailure>,
}

impl DispatchReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Reports each wrapper to the client, collecting failures per item.
pub struct Dispatcher<'c> {
    client: &'c dyn TestManagementClient,
    target: DispatchConfig,
}

impl<'c> Dispatcher<'c> {
    pub fn new(client: &'c dyn TestManagementClient, target: DispatchConfig) -> Self {
        Self { client, target }
    }

    /// Execution record for one wrapper. The configured platform wins over
    /// the test case's own.
    pub fn record_for(&self, wrapper: &ResultWrapper) -> ExecutionRecord {
        let test_case = &wrapper.test_case;
        ExecutionRecord {
            test_case_id: test_case.id,
            test_case_internal_id: test_case.execution_target_id(),
            plan_id: self.target.plan_id,
            build_id: self.target.build_id,
            build_name: self.target.build_name.clone(),
            platform: self
                .target
                .platform
                .clone()
                .or_else(|| test_case.platform.clone()),
            status: wrapper.status(),
            notes: wrapper.notes.clone(),
        }
    }

    /// Dispatch every wrapper in order. A failure never stops the rest.
    pub fn dispatch(&self, wrappers: &[ResultWrapper]) -> DispatchReport {
        let mut report = DispatchReport::default();

        for wrapper in wrappers {
            let record = self.record_for(wrapper);
            let execution_id = match self.client.report_execution(&record) {
                Ok(id) => id,
                Err(e) => {
                    tracing::warn!(
                        client = self.client.name(),
                        test_case = record.test_case_id,
                        error = %e,
                        "failed to report execution"
                    );
                    report.failures.push(DispatchFailure {
                        test_case_id: record.test_case_id,
                        attachment: None,
                        message: e.to_string(),
                    });
                    continue;
                }
            };
            tracing::debug!(
                test_case = record.test_case_id,
                execution_id,
                status = %record.status,
                "reported execution"
            );

            let mut uploaded = 0;
            for attachment in &wrapper.attachments {
                match self.client.upload_attachment(execution_id, attachment) {
                    Ok(()) => uploaded += 1,
                    Err(e) => {
                        tracing::warn!(
                            test_case = record.test_case_id,
                            attachment = %attachment.file_name,
                            error = %e,
                            "failed to upload attachment"
                        );
                        report.failures.push(DispatchFailure {
                            test_case_id: record.test_case_id,
                            attachment: Some(attachment.file_name.clone()),
                            message: e.to_string(),
                        });
                    }
                }
            }

            report.executions.push(DispatchedExecution {
                test_case_id: record.test_case_id,
                execution_id,
                status: record.status,
                attachments_uploaded: uploaded,
            });
        }

        report
    }
}
