use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{Build, CatalogSource, Project, TestPlan};
use crate::core::error::{Error, Result};
use crate::model::CatalogTestCase;

/// A catalog test case plus its execution type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct CatalogEntry {
    #[serde(flatten)]
    test_case: CatalogTestCase,
    #[serde(default = "default_automated")]
    automated: bool,
}

fn default_automated() -> bool {
    true
}

/// Catalog read from a JSON document:
///
/// ```json
/// {
///   "projects": [{ "id": 1, "name": "Shop", "prefix": "SH" }],
///   "plans": [{ "id": 12, "name": "Regression", "project-id": 1, "test-cases": [5] }],
///   "builds": [{ "id": 7, "name": "nightly-42", "plan-id": 12 }],
///   "test-cases": [{
///     "id": 5,
///     "name": "Login",
///     "custom-fields": [{ "name": "Java Class", "value": "a.Login" }]
///   }]
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct JsonCatalog {
    #[serde(default)]
    projects: Vec<Project>,
    #[serde(default)]
    plans: Vec<TestPlan>,
    #[serde(default)]
    builds: Vec<Build>,
    #[serde(default)]
    test_cases: Vec<CatalogEntry>,
}

impl JsonCatalog {
    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        Self::from_json_str(&std::fs::read_to_string(path)?)
    }

    /// Every automated test case, regardless of plan.
    pub fn all_automated(&self) -> Vec<CatalogTestCase> {
        self.test_cases
            .iter()
            .filter(|e| e.automated)
            .map(|e| e.test_case.clone())
            .collect()
    }

    pub fn test_case(&self, id: u32) -> Option<&CatalogTestCase> {
        self.test_cases
            .iter()
            .map(|e| &e.test_case)
            .find(|tc| tc.id == id)
    }

    pub fn plan_by_id(&self, id: u32) -> Option<&TestPlan> {
        self.plans.iter().find(|p| p.id == id)
    }

    pub fn project_by_id(&self, id: u32) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }
}

impl CatalogSource for JsonCatalog {
    fn project(&self, name: &str) -> Result<Project> {
        self.projects
            .iter()
            .find(|p| p.name == name)
            .cloned()
            .ok_or_else(|| Error::catalog(format!("project '{}' not found", name)))
    }

    fn plan(&self, project: &Project, name: &str) -> Result<TestPlan> {
        self.plans
            .iter()
            .find(|p| p.project_id == project.id && p.name == name)
            .cloned()
            .ok_or_else(|| {
                Error::catalog(format!("plan '{}' not found in project '{}'", name, project.name))
            })
    }

    fn build(&self, plan: &TestPlan, name: &str) -> Result<Option<Build>> {
        Ok(self
            .builds
            .iter()
            .find(|b| b.plan_id == plan.id && b.name == name)
            .cloned())
    }

    fn create_build(&mut self, plan: &TestPlan, name: &str, notes: Option<&str>) -> Result<Build> {
        let id = self.builds.iter().map(|b| b.id).max().unwrap_or(0) + 1;
        let build = Build {
            id,
            name: name.to_string(),
            plan_id: plan.id,
            notes: notes.map(String::from),
        };
        self.builds.push(build.clone());
        Ok(build)
    }

    fn automated_test_cases(&self, plan: &TestPlan) -> Result<Vec<CatalogTestCase>> {
        Ok(self
            .test_cases
            .iter()
            .filter(|e| e.automated && plan.test_cases.contains(&e.test_case.id))
            .map(|e| e.test_case.clone())
            .collect())
    }

    fn custom_field_value(&self, test_case_id: u32, field: &str) -> Result<Option<String>> {
        let test_case = self
            .test_case(test_case_id)
            .ok_or_else(|| Error::catalog(format!("test case {} not found", test_case_id)))?;
        Ok(test_case.custom_field(field).and_then(|f| f.value.clone()))
    }
}
