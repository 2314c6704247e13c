use std::path::Path;

use report_reconciler::config::{Config, SeekerConfig, SeekerKind};
use report_reconciler::model::CatalogTestCase;
use report_reconciler::{Error, ExecutionStatus, ReconcilerBuilder};

const PASSING_SUITE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<testsuite name="shop.LoginTest" tests="2" failures="0" errors="0" time="0.4">
  <testcase classname="shop.LoginTest" name="validUser" time="0.2"/>
  <testcase classname="shop.LoginTest" name="rememberMe" time="0.2"/>
</testsuite>
"#;

const FAILING_SUITE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<testsuite name="shop.CartTest" tests="2" failures="1" errors="0">
  <testcase classname="shop.CartTest" name="addItem"/>
  <testcase classname="shop.CartTest" name="removeItem">
    <failure message="expected 0 items" type="AssertionError">stack</failure>
  </testcase>
</testsuite>
"#;

fn write(dir: &Path, relative: &str, content: &str) {
    let path = dir.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn case(id: u32, keys: &str) -> CatalogTestCase {
    CatalogTestCase::new(id, format!("case {}", id)).with_custom_field("Java Class", keys)
}

#[test]
fn test_multiple_keys_across_files_merge_into_one_wrapper() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "a/TEST-shop.LoginTest.xml", PASSING_SUITE);
    write(dir.path(), "b/TEST-shop.CartTest.xml", FAILING_SUITE);

    let catalog = vec![case(1, "shop.LoginTest, shop.CartTest"), case(2, "shop.LoginTest")];
    let outcome = ReconcilerBuilder::new()
        .base_dir(dir.path())
        .seeker(SeekerKind::JunitSuiteName, "**/TEST-*.xml")
        .build()
        .unwrap()
        .scan(&catalog)
        .unwrap();

    assert_eq!(outcome.wrappers.len(), 2);
    let both = outcome.wrapper(1).unwrap();
    assert_eq!(both.key_statuses.len(), 2);
    assert_eq!(both.status(), ExecutionStatus::Failed);
    assert!(both.notes.contains("shop.LoginTest"));
    assert!(both.notes.contains("shop.CartTest"));
    assert_eq!(outcome.wrapper(2).unwrap().status(), ExecutionStatus::Passed);

    assert_eq!(outcome.summary.files_found, 2);
    assert_eq!(outcome.summary.files_matched, 2);
    assert_eq!(outcome.summary.files_failed, 0);
}

#[test]
fn test_blocked_and_unmatched_test_cases_are_untouched() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "TEST-shop.CartTest.xml", FAILING_SUITE);

    let mut catalog = vec![
        case(1, "shop.CartTest").with_status(ExecutionStatus::Blocked),
        case(2, "shop.SearchTest").with_status(ExecutionStatus::Passed),
        CatalogTestCase::new(3, "no keys"),
    ];
    let outcome = ReconcilerBuilder::new()
        .base_dir(dir.path())
        .seeker(SeekerKind::JunitSuiteName, "**/*.xml")
        .build()
        .unwrap()
        .scan(&catalog)
        .unwrap();

    assert!(outcome.wrappers.is_empty());
    outcome.apply_to(&mut catalog);
    assert_eq!(catalog[0].execution_status, ExecutionStatus::Blocked);
    assert_eq!(catalog[1].execution_status, ExecutionStatus::Passed);
    assert_eq!(catalog[2].execution_status, ExecutionStatus::NotRun);
    assert_eq!(outcome.summary.test_cases_unmatched, 3);
}

#[test]
fn test_same_key_in_two_files_keeps_evidence_from_both() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "one/TEST-shop.CartTest.xml", FAILING_SUITE);
    write(dir.path(), "two/TEST-shop.CartTest.xml", FAILING_SUITE);

    let mut seeker = SeekerConfig::new(SeekerKind::JunitSuiteName, "**/*.xml");
    seeker.attach_report = true;
    let config = Config {
        seekers: vec![seeker],
        ..Default::default()
    };

    let catalog = vec![case(1, "shop.CartTest")];
    let outcome = ReconcilerBuilder::new()
        .with_config(config)
        .base_dir(dir.path())
        .build()
        .unwrap()
        .scan(&catalog)
        .unwrap();

    let wrapper = outcome.wrapper(1).unwrap();
    assert_eq!(wrapper.key_statuses.len(), 1);
    assert_eq!(wrapper.status(), ExecutionStatus::Failed);

    assert_eq!(wrapper.attachments.len(), 2);
    let descriptions: Vec<&str> = wrapper
        .attachments
        .iter()
        .map(|a| a.description.as_str())
        .collect();
    assert!(descriptions[0].contains("one/TEST-shop.CartTest.xml"));
    assert!(descriptions[1].contains("two/TEST-shop.CartTest.xml"));

    let (first, second) = wrapper.notes.split_at(wrapper.notes.len() / 2);
    assert_eq!(second.strip_prefix('\n'), Some(first));
    assert!(first.contains("shop.CartTest"));
}

#[test]
fn test_invalid_report_is_skipped_and_reported() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "TEST-shop.LoginTest.xml", PASSING_SUITE);
    write(
        dir.path(),
        "TEST-shop.Broken.xml",
        r#"<testsuite name="shop.CartTest" failures="3"><testcase name="x"/></testsuite>"#,
    );
    write(dir.path(), "TEST-garbage.xml", "<testsuite name=");

    let catalog = vec![case(1, "shop.LoginTest"), case(2, "shop.CartTest")];
    let outcome = ReconcilerBuilder::new()
        .base_dir(dir.path())
        .seeker(SeekerKind::JunitSuiteName, "*.xml")
        .build()
        .unwrap()
        .scan(&catalog)
        .unwrap();

    assert_eq!(outcome.wrappers.len(), 1);
    assert_eq!(outcome.wrapper(1).unwrap().status(), ExecutionStatus::Passed);
    assert!(outcome.wrapper(2).is_none());
    assert_eq!(outcome.summary.files_found, 3);
    assert_eq!(outcome.summary.files_failed, 2);
    assert_eq!(outcome.summary.failures.len(), 2);
}

#[test]
fn test_junit_method_seeker() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "TEST-shop.CartTest.xml", FAILING_SUITE);

    let catalog = vec![
        case(1, "shop.CartTest.addItem"),
        case(2, "shop.CartTest.removeItem"),
    ];
    let outcome = ReconcilerBuilder::new()
        .base_dir(dir.path())
        .seeker(SeekerKind::JunitMethodName, "*.xml")
        .build()
        .unwrap()
        .scan(&catalog)
        .unwrap();

    assert_eq!(outcome.wrapper(1).unwrap().status(), ExecutionStatus::Passed);
    let removed = outcome.wrapper(2).unwrap();
    assert_eq!(removed.status(), ExecutionStatus::Failed);
    assert!(removed.notes.contains("expected 0 items"));
}

#[test]
fn test_tap_skip_wins_over_failure() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "t/checkout.tap",
        "TAP version 13\n1..3\nok 1 - cart\nnot ok 2 - pay\nok 3 - ship # SKIP no carrier\n",
    );
    write(dir.path(), "t/search.tap", "1..2\nok 1\nnot ok 2 - ranking\n");

    let catalog = vec![
        CatalogTestCase::new(1, "checkout").with_custom_field("TAP File", "checkout"),
        CatalogTestCase::new(2, "search").with_custom_field("TAP File", "search"),
    ];
    let mut tap = SeekerConfig::new(SeekerKind::TapFileName, "**/*.tap");
    tap.key_field = Some("TAP File".to_string());

    let config = Config {
        seekers: vec![tap],
        ..Default::default()
    };
    let outcome = ReconcilerBuilder::new()
        .with_config(config)
        .base_dir(dir.path())
        .build()
        .unwrap()
        .scan(&catalog)
        .unwrap();

    assert_eq!(outcome.wrapper(1).unwrap().status(), ExecutionStatus::Blocked);
    assert_eq!(outcome.wrapper(2).unwrap().status(), ExecutionStatus::Failed);
}

#[test]
fn test_tap_full_path_identity() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "suite/login.tap", "1..1\nok 1\n");

    let catalog = vec![
        CatalogTestCase::new(1, "short").with_custom_field("Java Class", "login"),
        CatalogTestCase::new(2, "full").with_custom_field("Java Class", "suite/login"),
    ];
    let mut config = Config::default();
    config.tap.compare_full_path = true;
    config.seekers.push(SeekerConfig::new(SeekerKind::TapFileName, "**/*.tap"));

    let outcome = ReconcilerBuilder::new()
        .with_config(config)
        .base_dir(dir.path())
        .build()
        .unwrap()
        .scan(&catalog)
        .unwrap();

    assert!(outcome.wrapper(1).is_none());
    assert_eq!(outcome.wrapper(2).unwrap().status(), ExecutionStatus::Passed);
}

#[test]
fn test_testng_config_methods_do_not_count() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "testng-results.xml",
        r#"<?xml version="1.0" encoding="UTF-8"?>
<testng-results>
  <suite name="Shop">
    <test name="checkout">
      <class name="shop.PaymentTest">
        <test-method status="FAIL" signature="setUp()" name="setUp" is-config="true"/>
        <test-method status="PASS" signature="pay()" name="pay"/>
      </class>
    </test>
  </suite>
</testng-results>
"#,
    );

    let catalog = vec![case(1, "shop.PaymentTest"), case(2, "shop.PaymentTest#pay")];
    let outcome = ReconcilerBuilder::new()
        .base_dir(dir.path())
        .seeker(SeekerKind::TestngClassName, "testng-results.xml")
        .seeker(SeekerKind::TestngMethodName, "testng-results.xml")
        .build()
        .unwrap()
        .scan(&catalog)
        .unwrap();

    assert_eq!(outcome.wrapper(1).unwrap().status(), ExecutionStatus::Passed);
    assert_eq!(outcome.wrapper(2).unwrap().status(), ExecutionStatus::Passed);
    assert_eq!(outcome.summary.files_found, 1);
}

#[test]
fn test_report_attached_once_per_test_case() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "TEST-shop.CartTest.xml", FAILING_SUITE);

    let catalog = vec![case(1, "shop.CartTest.addItem, shop.CartTest.removeItem")];
    let mut seeker = SeekerConfig::new(SeekerKind::JunitMethodName, "*.xml");
    seeker.attach_report = true;
    let config = Config {
        seekers: vec![seeker],
        ..Default::default()
    };

    let outcome = ReconcilerBuilder::new()
        .with_config(config)
        .base_dir(dir.path())
        .build()
        .unwrap()
        .scan(&catalog)
        .unwrap();

    let wrapper = outcome.wrapper(1).unwrap();
    assert_eq!(wrapper.key_statuses.len(), 2);
    assert_eq!(wrapper.attachments.len(), 1);
    assert_eq!(wrapper.attachments[0].file_name, "TEST-shop.CartTest.xml");
}

#[test]
fn test_no_keys_still_counts_files() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "TEST-shop.CartTest.xml", FAILING_SUITE);

    let catalog = vec![CatalogTestCase::new(1, "no keys")];
    let outcome = ReconcilerBuilder::new()
        .base_dir(dir.path())
        .seeker(SeekerKind::JunitSuiteName, "**/*.xml")
        .build()
        .unwrap()
        .scan(&catalog)
        .unwrap();

    assert!(outcome.wrappers.is_empty());
    assert_eq!(outcome.summary.files_found, 1);
    assert_eq!(outcome.summary.files_matched, 0);
}

#[test]
fn test_missing_base_dir_fails_even_without_keys() {
    let catalog = vec![CatalogTestCase::new(1, "no keys")];
    let result = ReconcilerBuilder::new()
        .base_dir("/nonexistent/reports")
        .seeker(SeekerKind::JunitSuiteName, "**/*.xml")
        .build()
        .unwrap()
        .scan(&catalog);

    assert!(matches!(result, Err(Error::FileNotFound(_))));
}

#[cfg(unix)]
#[test]
fn test_symlink_loop_does_not_hide_valid_reports() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "TEST-shop.LoginTest.xml", PASSING_SUITE);
    std::fs::create_dir_all(dir.path().join("sub")).unwrap();
    std::os::unix::fs::symlink("..", dir.path().join("sub/loop")).unwrap();

    let catalog = vec![case(1, "shop.LoginTest")];
    let outcome = ReconcilerBuilder::new()
        .base_dir(dir.path())
        .seeker(SeekerKind::JunitSuiteName, "**/TEST-*.xml")
        .build()
        .unwrap()
        .scan(&catalog)
        .unwrap();

    assert_eq!(outcome.wrapper(1).unwrap().status(), ExecutionStatus::Passed);
    assert_eq!(outcome.summary.files_found, 1);
    assert!(outcome.summary.seeker_failures.is_empty());
}
