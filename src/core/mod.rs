//! Core types for the reconciliation pipeline: builder, context, and error handling.

pub mod builder;
pub mod context;
pub mod error;

pub use builder::{Reconciler, ReconcilerBuilder};
pub use context::{ReportFile, ScanContext};
pub use error::{Error, Result};
