//! Environment handed to an automated test when it is executed for a build.

use indexmap::IndexMap;

use crate::model::CatalogTestCase;

const PREFIX: &str = "TESTLINK";

/// Build the environment variables describing one test case execution.
///
/// Optional test case attributes that are unknown are left out. Custom
/// fields are exposed as `TESTLINK.TESTCASE.<FIELD>`, with the field name
/// upper-cased and whitespace runs replaced by `_`.
pub fn test_environment(
    test_case: &CatalogTestCase,
    build_name: &str,
    plan_name: &str,
    project_name: &str,
) -> IndexMap<String, String> {
    let mut env = IndexMap::new();
    let mut set = |key: &str, value: String| {
        env.insert(format!("{PREFIX}.{key}"), value);
    };

    set("TESTCASE.ID", test_case.id.to_string());
    set("TESTCASE.NAME", test_case.name.clone());
    if let Some(id) = test_case.test_suite_id {
        set("TESTCASE.TESTSUITEID", id.to_string());
    }
    if let Some(id) = test_case.test_project_id {
        set("TESTCASE.TESTPROJECTID", id.to_string());
    }
    if let Some(ref author) = test_case.author {
        set("TESTCASE.AUTHOR", author.clone());
    }
    if let Some(ref summary) = test_case.summary {
        set("TESTCASE.SUMMARY", summary.clone());
    }
    set("BUILD.NAME", build_name.to_string());
    set("TESTPLAN.NAME", plan_name.to_string());
    set("TESTPROJECT.NAME", project_name.to_string());

    for field in &test_case.custom_fields {
        let key = format!("TESTCASE.{}", field_variable_name(&field.name));
        set(&key, field.value.clone().unwrap_or_default());
    }

    env
}

fn field_variable_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_uppercase()
}
