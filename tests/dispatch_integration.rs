use std::path::Path;

use report_reconciler::client::{CatalogSource, JsonCatalog, RecordingClient};
use report_reconciler::config::{Config, DispatchConfig, SeekerConfig, SeekerKind};
use report_reconciler::{ExecutionStatus, ReconcilerBuilder};

const CATALOG: &str = r#"{
    "projects": [{ "id": 1, "name": "Shop", "prefix": "SH" }],
    "plans": [{ "id": 12, "name": "Regression", "project-id": 1, "test-cases": [5, 6, 7] }],
    "builds": [{ "id": 7, "name": "nightly-42", "plan-id": 12 }],
    "test-cases": [
        { "id": 5, "internal-id": 105, "name": "Login",
          "custom-fields": [{ "name": "Java Class", "value": "shop.LoginTest" }] },
        { "id": 6, "internal-id": 106, "name": "Checkout",
          "custom-fields": [{ "name": "Java Class", "value": "checkout" }] },
        { "id": 7, "name": "Search", "execution-status": "blocked",
          "custom-fields": [{ "name": "Java Class", "value": "shop.LoginTest" }] }
    ]
}"#;

fn write(dir: &Path, relative: &str, content: &str) {
    std::fs::write(dir.join(relative), content).unwrap();
}

#[test]
fn test_scan_and_dispatch_through_recording_client() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "TEST-shop.LoginTest.xml",
        r#"<testsuite name="shop.LoginTest">
             <testcase classname="shop.LoginTest" name="ok"/>
           </testsuite>"#,
    );
    write(
        dir.path(),
        "checkout.tap",
        "TAP version 13\n1..1\nnot ok 1 - pay\n  ---\n  message: declined\n  ...\n",
    );

    let catalog = JsonCatalog::from_json_str(CATALOG).unwrap();
    let plan = catalog.plan(&catalog.project("Shop").unwrap(), "Regression").unwrap();
    let build = catalog.build(&plan, "nightly-42").unwrap().unwrap();
    let test_cases = catalog.automated_test_cases(&plan).unwrap();

    let mut junit = SeekerConfig::new(SeekerKind::JunitSuiteName, "*.xml");
    junit.attach_report = true;
    let config = Config {
        seekers: vec![junit, SeekerConfig::new(SeekerKind::TapFileName, "*.tap")],
        dispatch: DispatchConfig {
            plan_id: Some(plan.id),
            build_id: Some(build.id),
            build_name: Some(build.name.clone()),
            platform: None,
        },
        ..Default::default()
    };

    let reconciler = ReconcilerBuilder::new()
        .with_config(config)
        .base_dir(dir.path())
        .build()
        .unwrap();
    let outcome = reconciler.scan(&test_cases).unwrap();
    assert_eq!(outcome.wrappers.len(), 2);

    let client = RecordingClient::new();
    let report = reconciler.dispatch(&outcome, &client);
    assert!(report.is_success());

    let executions = client.executions();
    assert_eq!(executions.len(), 2);
    assert_eq!(executions[0].record.test_case_internal_id, 105);
    assert_eq!(executions[0].record.status, ExecutionStatus::Passed);
    assert_eq!(executions[0].record.build_id, Some(7));
    assert_eq!(executions[1].record.test_case_internal_id, 106);
    assert_eq!(executions[1].record.status, ExecutionStatus::Failed);
    assert!(executions[1].record.notes.contains("pay"));

    let uploads = client.uploads();
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].execution_id, executions[0].execution_id);
}

#[test]
fn test_rejected_execution_does_not_stop_dispatch() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "login.tap", "1..1\nok 1\n");
    write(dir.path(), "checkout.tap", "1..1\nok 1\n");

    let catalog = JsonCatalog::from_json_str(CATALOG).unwrap();
    let mut test_cases = catalog.all_automated();
    test_cases[0].custom_fields[0].value = Some("login".to_string());

    let reconciler = ReconcilerBuilder::new()
        .base_dir(dir.path())
        .seeker(SeekerKind::TapFileName, "*.tap")
        .build()
        .unwrap();
    let outcome = reconciler.scan(&test_cases).unwrap();

    let client = RecordingClient::new().fail_test_case(5);
    let report = reconciler.dispatch(&outcome, &client);
    assert!(!report.is_success());
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].test_case_id, 5);
    assert_eq!(report.executions.len(), 1);
    assert_eq!(report.executions[0].test_case_id, 6);
}
