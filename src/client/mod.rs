//! Boundary with the external test-management system.
//!
//! Transport is not part of this crate; these traits describe what the
//! reconciler needs from a client, and the in-crate implementations serve
//! dry runs, local catalogs and tests.

use serde::{Deserialize, Serialize};

use crate::core::error::Result;
use crate::model::{Attachment, CatalogTestCase, ExecutionStatus};

mod catalog;
mod recording;

pub use catalog::JsonCatalog;
pub use recording::{RecordedExecution, RecordedUpload, RecordingClient};

/// One execution result to report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ExecutionRecord {
    pub test_case_id: u32,
    pub test_case_internal_id: u32,
    pub plan_id: Option<u32>,
    pub build_id: Option<u32>,
    pub build_name: Option<String>,
    pub platform: Option<String>,
    pub status: ExecutionStatus,
    pub notes: String,
}

/// Write half of the test-management client.
pub trait TestManagementClient: Send + Sync {
    /// Report one execution, returning the id of the created record.
    fn report_execution(&self, record: &ExecutionRecord) -> Result<u64>;

    /// Upload one attachment against an execution record.
    fn upload_attachment(&self, execution_id: u64, attachment: &Attachment) -> Result<()>;

    /// Get a human-readable name for this client.
    fn name(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Project {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub prefix: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TestPlan {
    pub id: u32,
    pub name: String,
    pub project_id: u32,
    /// Ids of the test cases assigned to the plan.
    #[serde(default)]
    pub test_cases: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Build {
    pub id: u32,
    pub name: String,
    pub plan_id: u32,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Read half of the test-management client: the catalog.
pub trait CatalogSource {
    fn project(&self, name: &str) -> Result<Project>;

    fn plan(&self, project: &Project, name: &str) -> Result<TestPlan>;

    /// Look up a build of a plan; `None` when it does not exist yet.
    fn build(&self, plan: &TestPlan, name: &str) -> Result<Option<Build>>;

    fn create_build(&mut self, plan: &TestPlan, name: &str, notes: Option<&str>) -> Result<Build>;

    /// Test cases of a plan whose execution type is automated.
    fn automated_test_cases(&self, plan: &TestPlan) -> Result<Vec<CatalogTestCase>>;

    /// Value of a named custom field of a test case.
    fn custom_field_value(&self, test_case_id: u32, field: &str) -> Result<Option<String>>;

    /// Look up a build, creating it when absent.
    fn ensure_build(&mut self, plan: &TestPlan, name: &str, notes: Option<&str>) -> Result<Build> {
        match self.build(plan, name)? {
            Some(build) => Ok(build),
            None => {
                tracing::info!(plan = %plan.name, build = name, "creating build");
                self.create_build(plan, name, notes)
            }
        }
    }
}
