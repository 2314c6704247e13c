//! report-reconciler: matches automated test results to test cases in a
//! test-management catalog.
//!
//! Reports (JUnit XML, TestNG XML and TAP streams) are found under a base
//! directory, parsed, and turned into units whose identity is compared with
//! the comma-separated keys each catalog test case declares in a custom
//! field. Every matched test case ends up with one [`ResultWrapper`]
//! carrying the folded status, notes and attachments of all its matches.
//!
//! # Quick Start
//!
//! ```no_run
//! use report_reconciler::builder;
//! use report_reconciler::config::SeekerKind;
//! use report_reconciler::model::CatalogTestCase;
//!
//! # fn main() -> report_reconciler::Result<()> {
//! let catalog = vec![
//!     CatalogTestCase::new(1, "Login").with_custom_field("Java Class", "shop.LoginTest"),
//! ];
//!
//! let outcome = builder()
//!     .base_dir("target/surefire-reports")
//!     .seeker(SeekerKind::JunitSuiteName, "**/TEST-*.xml")
//!     .build()?
//!     .scan(&catalog)?;
//!
//! for wrapper in &outcome.wrappers {
//!     println!("{} -> {}", wrapper.test_case.name, wrapper.status());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration file
//!
//! ```toml
//! base-dir = "target/reports"
//! key-field = "Java Class"
//!
//! [[seekers]]
//! kind = "junit-suite-name"
//! include = "**/TEST-*.xml"
//! attach-report = true
//!
//! [[seekers]]
//! kind = "tap-file-name"
//! include = "**/*.tap"
//! key-field = "TAP File"
//!
//! [dispatch]
//! build-name = "nightly-42"
//! ```
//!
//! # Architecture
//!
//! - [`ReportParser`](report::ReportParser): reads one report format
//! - [`ResultSeeker`](seeker::ResultSeeker): turns a parsed report into matchable units
//! - [`MergeEngine`](merge::MergeEngine): folds matches into one wrapper per test case
//! - [`TestManagementClient`](client::TestManagementClient): receives the final executions
//!
//! # Features
//!
//! - `default` - Enables `cli`
//! - `cli` - The `report-reconciler` binary
//! - `progress` - Progress bars while scanning report files

pub mod client;
pub mod config;
pub mod core;
pub mod dispatch;
pub mod executor;
pub mod merge;
pub mod model;
pub mod report;
pub mod seeker;
pub mod summary;
pub mod util;

// Re-export commonly used types
pub use crate::core::{Error, Reconciler, ReconcilerBuilder, Result};
pub use config::{Config, SeekerConfig, SeekerKind};
pub use merge::ResultWrapper;
pub use model::{CatalogTestCase, ExecutionStatus};
pub use summary::ScanOutcome;

/// Create a new reconciler builder.
///
/// This is the main entry point for the fluent API.
pub fn builder() -> ReconcilerBuilder {
    ReconcilerBuilder::new()
}
