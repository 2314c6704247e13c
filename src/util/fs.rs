use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::core::error::{Error, Result};

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir_exists(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Compile a comma-separated list of Ant-style patterns.
///
/// `**` crosses directories, `*` and `?` stay inside one path segment and a
/// trailing `/` selects everything below that directory. Returns `None` when
/// the list holds no pattern at all.
pub fn compile_include(include: &str) -> Result<Option<GlobSet>> {
    let mut builder = GlobSetBuilder::new();
    let mut any = false;

    for pattern in include.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let pattern = pattern.replace('\\', "/");
        let pattern = if pattern.ends_with('/') {
            format!("{}**", pattern)
        } else {
            pattern
        };
        let glob = GlobBuilder::new(&pattern).literal_separator(true).build()?;
        builder.add(glob);
        any = true;
    }

    if !any {
        return Ok(None);
    }
    Ok(Some(builder.build()?))
}

/// Relative path rendered with `/` separators on every platform.
pub fn slash_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Find the files below `base_dir` matching `include`.
///
/// Paths are returned relative to `base_dir`, sorted. A blank pattern list
/// yields no files. Entries that cannot be read, such as symlink loops or
/// unreadable directories, are logged and skipped.
pub fn scan_files(base_dir: &Path, include: &str) -> Result<Vec<PathBuf>> {
    if !base_dir.exists() {
        return Err(Error::FileNotFound(base_dir.to_path_buf()));
    }
    if !base_dir.is_dir() {
        return Err(Error::NotADirectory(base_dir.to_path_buf()));
    }

    let Some(globs) = compile_include(include)? else {
        return Ok(Vec::new());
    };

    let mut files = Vec::new();
    for entry in WalkDir::new(base_dir).follow_links(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(
                    base_dir = %base_dir.display(),
                    error = %e,
                    "skipping unreadable entry"
                );
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(base_dir) else {
            continue;
        };
        if globs.is_match(slash_path(relative)) {
            files.push(relative.to_path_buf());
        }
    }

    files.sort();
    tracing::debug!(
        base_dir = %base_dir.display(),
        include,
        found = files.len(),
        "scanned for report files"
    );
    Ok(files)
}
