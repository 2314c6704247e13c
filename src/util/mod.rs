//! Filesystem helpers: report discovery and directory setup.

pub mod fs;

pub use fs::{ensure_dir_exists, scan_files, slash_path};
