use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::error::{Error, Result};

/// Evidence uploaded against an execution record.
///
/// Content is stored base64-encoded, ready for the test-management API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Attachment {
    pub file_name: String,
    pub title: String,
    pub description: String,
    pub file_type: String,
    pub file_size: u64,
    pub content: String,
}

impl Attachment {
    /// Build an attachment from raw bytes.
    pub fn from_bytes(
        file_name: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        bytes: &[u8],
    ) -> Self {
        let file_name = file_name.into();
        Self {
            file_type: mime_type_for(&file_name).to_string(),
            file_name,
            title: title.into(),
            description: description.into(),
            file_size: bytes.len() as u64,
            content: STANDARD.encode(bytes),
        }
    }

    /// Read a file from disk and build an attachment from it.
    pub fn from_path(
        path: &Path,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| Error::attachment(format!("invalid file name: {}", path.display())))?;
        Ok(Self::from_bytes(file_name, title, description, &bytes))
    }

    /// Build an attachment whose content is already base64-encoded.
    ///
    /// The encoding is checked; the size is taken from the decoded content
    /// unless `file_size` is given.
    pub fn from_base64(
        file_name: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        content: &str,
        file_size: Option<u64>,
    ) -> Result<Self> {
        let file_name = file_name.into();
        let compact: String = content.split_whitespace().collect();
        let decoded = STANDARD.decode(compact.as_bytes()).map_err(|e| {
            Error::attachment(format!("invalid base64 content for '{}': {}", file_name, e))
        })?;
        Ok(Self {
            file_type: mime_type_for(&file_name).to_string(),
            file_name,
            title: title.into(),
            description: description.into(),
            file_size: file_size.unwrap_or(decoded.len() as u64),
            content: compact,
        })
    }

    /// Override the file type.
    pub fn with_file_type(mut self, file_type: impl Into<String>) -> Self {
        self.file_type = file_type.into();
        self
    }

    /// Decode the content back to bytes.
    pub fn decoded(&self) -> Result<Vec<u8>> {
        STANDARD
            .decode(self.content.as_bytes())
            .map_err(|e| {
                Error::attachment(format!(
                    "invalid base64 content for '{}': {}",
                    self.file_name, e
                ))
            })
    }
}

/// Guess a mime type from a file extension.
pub fn mime_type_for(file_name: &str) -> &'static str {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("xml") => "text/xml",
        Some("tap") | Some("txt") | Some("log") => "text/plain",
        Some("json") => "application/json",
        Some("yaml") | Some("yml") => "application/x-yaml",
        Some("html") | Some("htm") => "text/html",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("pdf") => "application/pdf",
        Some("zip") => "application/zip",
        _ => "application/octet-stream",
    }
}
