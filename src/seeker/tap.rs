use std::path::{Path, PathBuf};

use super::{ResultSeeker, SeekUnit, notes, wrong_report};
use crate::config::SeekerKind;
use crate::core::context::{ReportFile, ScanContext};
use crate::core::error::{Error, Result};
use crate::model::Attachment;
use crate::report::ParsedReport;
use crate::report::tap::{EmbeddedFile, TapTestSet};

/// Seeker over TAP streams: one unit per file, identified by its name.
pub struct TapSeeker;

impl TapSeeker {
    pub fn new() -> Self {
        Self
    }

    /// File stem, or the relative path without extension when configured.
    pub fn identity(ctx: &ScanContext, file: &ReportFile) -> String {
        if ctx.config.tap.compare_full_path {
            file.relative_stem()
        } else {
            file.stem()
        }
    }

    fn embedded_attachments(
        ctx: &ScanContext,
        file: &ReportFile,
        set: &TapTestSet,
    ) -> Vec<Attachment> {
        set.embedded_files()
            .iter()
            .filter_map(|embedded| match embedded_attachment(ctx, file, embedded) {
                Ok(attachment) => Some(attachment),
                Err(e) => {
                    tracing::warn!(
                        file = %file.relative.display(),
                        entry = %embedded.key,
                        error = %e,
                        "skipping embedded attachment"
                    );
                    None
                }
            })
            .collect()
    }
}

impl Default for TapSeeker {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve `File-Location` against the report's directory, then the base dir.
fn resolve_location(ctx: &ScanContext, file: &ReportFile, location: &str) -> Option<PathBuf> {
    let location = Path::new(location);
    if location.is_absolute() {
        return location.is_file().then(|| location.to_path_buf());
    }
    [file.dir().join(location), ctx.base_dir.join(location)]
        .into_iter()
        .find(|candidate| candidate.is_file())
}

fn embedded_attachment(
    ctx: &ScanContext,
    file: &ReportFile,
    embedded: &EmbeddedFile,
) -> Result<Attachment> {
    let title = embedded.title.clone().unwrap_or_default();
    let description = embedded.description.clone().unwrap_or_default();

    let mut attachment = if let Some(ref content) = embedded.content {
        let name = embedded.name.clone().unwrap_or_else(|| embedded.key.clone());
        Attachment::from_base64(name, title, description, content, embedded.size)?
    } else if let Some(ref location) = embedded.location {
        let path = resolve_location(ctx, file, location)
            .ok_or_else(|| Error::FileNotFound(PathBuf::from(location)))?;
        let mut attachment = Attachment::from_path(&path, title, description)?;
        if let Some(ref name) = embedded.name {
            attachment.file_name = name.clone();
        }
        attachment
    } else {
        return Err(Error::attachment(format!(
            "entry '{}' has neither File-Content nor File-Location",
            embedded.key
        )));
    };

    if let Some(ref file_type) = embedded.file_type {
        attachment = attachment.with_file_type(file_type.clone());
    }
    Ok(attachment)
}

impl ResultSeeker for TapSeeker {
    fn kind(&self) -> SeekerKind {
        SeekerKind::TapFileName
    }

    fn units(
        &self,
        ctx: &ScanContext,
        file: &ReportFile,
        report: &ParsedReport,
    ) -> Result<Vec<SeekUnit>> {
        let ParsedReport::Tap(set) = report else {
            return Err(wrong_report(self, report));
        };
        let identity = Self::identity(ctx, file);
        if identity.is_empty() {
            return Ok(Vec::new());
        }

        let mut unit = SeekUnit::new(identity, set.status());
        if ctx.config.include_notes {
            unit.notes = notes::tap(set);
        }
        if ctx.config.tap.attach_yamlish_attachments {
            unit.attachments = Self::embedded_attachments(ctx, file, set);
        }
        Ok(vec![unit])
    }

    fn name(&self) -> &str {
        "tap-file-name"
    }
}
