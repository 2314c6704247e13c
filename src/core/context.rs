use crate::config::Config;
use std::path::{Path, PathBuf};

/// Context object that carries state through one scan.
pub struct ScanContext {
    /// Configuration.
    pub config: Config,

    /// Directory include patterns are evaluated against.
    pub base_dir: PathBuf,
}

impl ScanContext {
    /// Create a context from a configuration.
    pub fn new(config: Config) -> Self {
        let base_dir = config.base_dir.clone();
        Self { config, base_dir }
    }

    /// Describe a report file found below the base directory.
    pub fn report_file(&self, relative: impl Into<PathBuf>) -> ReportFile {
        ReportFile::new(&self.base_dir, relative)
    }
}

/// A report file, known both by its path relative to the base directory and
/// by its full path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportFile {
    pub relative: PathBuf,
    pub path: PathBuf,
}

impl ReportFile {
    pub fn new(base_dir: &Path, relative: impl Into<PathBuf>) -> Self {
        let relative = relative.into();
        Self {
            path: base_dir.join(&relative),
            relative,
        }
    }

    /// File name, lossily converted.
    pub fn file_name(&self) -> String {
        self.relative
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// File name without its extension.
    pub fn stem(&self) -> String {
        self.relative
            .file_stem()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Relative path without the extension, `/`-separated.
    pub fn relative_stem(&self) -> String {
        crate::util::slash_path(&self.relative.with_extension(""))
    }

    /// Directory holding the file.
    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }
}
