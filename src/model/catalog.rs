use serde::{Deserialize, Serialize};

use super::ExecutionStatus;

/// A custom field attached to a catalog test case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomField {
    pub name: String,
    #[serde(default)]
    pub value: Option<String>,
}

impl CustomField {
    /// Create a custom field with a value.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
        }
    }
}

/// A test case as defined in the external test-management system.
///
/// Read-only from the engine's point of view except for `execution_status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CatalogTestCase {
    /// External (human-facing) id.
    pub id: u32,

    /// Internal id used when reporting executions.
    #[serde(default)]
    pub internal_id: Option<u32>,

    pub name: String,

    #[serde(default)]
    pub version: Option<u32>,

    #[serde(default)]
    pub test_suite_id: Option<u32>,

    #[serde(default)]
    pub test_project_id: Option<u32>,

    #[serde(default)]
    pub author: Option<String>,

    #[serde(default)]
    pub summary: Option<String>,

    #[serde(default)]
    pub custom_fields: Vec<CustomField>,

    #[serde(default)]
    pub platform: Option<String>,

    #[serde(default)]
    pub execution_status: ExecutionStatus,
}

impl CatalogTestCase {
    /// Create a test case with only an id and a name.
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            internal_id: None,
            name: name.into(),
            version: None,
            test_suite_id: None,
            test_project_id: None,
            author: None,
            summary: None,
            custom_fields: Vec::new(),
            platform: None,
            execution_status: ExecutionStatus::NotRun,
        }
    }

    /// Add a custom field.
    pub fn with_custom_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom_fields.push(CustomField::new(name, value));
        self
    }

    /// Set the execution status.
    pub fn with_status(mut self, status: ExecutionStatus) -> Self {
        self.execution_status = status;
        self
    }

    /// Look up a custom field by name, ignoring ASCII case.
    pub fn custom_field(&self, name: &str) -> Option<&CustomField> {
        self.custom_fields
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(name))
    }

    /// Match keys declared in the given key field.
    ///
    /// The field value is split on commas and each token trimmed; empty
    /// tokens are dropped. Returns an empty list when the field is absent or
    /// blank.
    pub fn match_keys(&self, key_field: &str) -> Vec<String> {
        self.custom_field(key_field)
            .and_then(|f| f.value.as_deref())
            .map(split_keys)
            .unwrap_or_default()
    }

    /// Whether the status was set externally to blocked.
    pub fn is_blocked(&self) -> bool {
        self.execution_status == ExecutionStatus::Blocked
    }

    /// Id to report executions against: the internal id when known.
    pub fn execution_target_id(&self) -> u32 {
        self.internal_id.unwrap_or(self.id)
    }
}

/// Split a comma-separated key list.
pub fn split_keys(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(String::from)
        .collect()
}
