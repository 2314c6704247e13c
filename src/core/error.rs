use std::path::{Path, PathBuf};

/// Result type alias for report-reconciler operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for report-reconciler.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed report content.
    #[error("Parse error in {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    /// Report content that parses but contradicts itself (declared counts
    /// that do not match the parsed elements).
    #[error("Validation error in {}: {message}", .path.display())]
    Validation { path: PathBuf, message: String },

    /// Attachment could not be built.
    #[error("Attachment error: {0}")]
    Attachment(String),

    /// The external test-management client rejected or failed a call.
    #[error("Dispatch error: {0}")]
    Dispatch(String),

    /// Catalog lookup errors.
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// File not found.
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Path exists but is not a directory.
    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// Missing required configuration field.
    #[error("Missing required configuration field: {0}")]
    MissingConfig(String),

    /// Invalid configuration value.
    #[error("Invalid configuration value for {field}: {value}")]
    InvalidConfig { field: String, value: String },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML deserialization error.
    #[error("TOML parsing error: {0}")]
    TomlDe(#[from] toml::de::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Invalid include pattern.
    #[error("Glob error: {0}")]
    Glob(#[from] globset::Error),

    /// Directory walk error.
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

impl Error {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create a parse error for the given report file.
    pub fn parse(path: impl AsRef<Path>, msg: impl Into<String>) -> Self {
        Error::Parse {
            path: path.as_ref().to_path_buf(),
            message: msg.into(),
        }
    }

    /// Create a validation error for the given report file.
    pub fn validation(path: impl AsRef<Path>, msg: impl Into<String>) -> Self {
        Error::Validation {
            path: path.as_ref().to_path_buf(),
            message: msg.into(),
        }
    }

    /// Create an attachment error.
    pub fn attachment(msg: impl Into<String>) -> Self {
        Error::Attachment(msg.into())
    }

    /// Create a dispatch error.
    pub fn dispatch(msg: impl Into<String>) -> Self {
        Error::Dispatch(msg.into())
    }

    /// Create a catalog error.
    pub fn catalog(msg: impl Into<String>) -> Self {
        Error::Catalog(msg.into())
    }

    /// Whether this error means the report content itself is unusable.
    ///
    /// Validation errors are a kind of parse error: the file is skipped and
    /// the scan continues.
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Error::Parse { .. } | Error::Validation { .. })
    }
}
