//! Domain types shared across the pipeline: catalog test cases, execution
//! statuses and attachments.

mod attachment;
mod catalog;
mod status;

pub use attachment::{Attachment, mime_type_for};
pub use catalog::{CatalogTestCase, CustomField, split_keys};
pub use status::ExecutionStatus;
