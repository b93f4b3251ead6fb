/*!
 * CSV artifact writer.
 *
 * One artifact aggregates every file of a group: a `filename,content` header
 * and one row per file. Files with non-ASCII names are left out, and a group
 * with no remaining rows produces no artifact at all, since an existing artifact
 * is what marks a label as done.
 */

use anyhow::{Context, Result};
use log::{debug, warn};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::file_utils::FileManager;

/// One CSV row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Row {
    /// File name with extension, no directory
    pub filename: String,
    /// Full text, undecodable bytes dropped
    pub content: String,
}

/// What `write_group` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Artifact created with this many rows
    Written { rows: usize },
    /// Nothing qualified, nothing created
    NoQualifyingRows,
}

/// Collect the rows for a group: case-insensitive path order, ASCII names only
pub fn collect_rows(files: &[PathBuf]) -> Vec<Row> {
    let mut ordered: Vec<&PathBuf> = files.iter().collect();
    ordered.sort_by_cached_key(|path| path.to_string_lossy().to_lowercase());

    let mut rows = Vec::with_capacity(ordered.len());
    for path in ordered {
        if !FileManager::has_ascii_name(path) {
            debug!("Skipping non-ASCII file name: {}", path.display());
            continue;
        }
        match FileManager::read_to_string_lossy(path) {
            Ok(content) => rows.push(Row {
                filename: path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                content,
            }),
            Err(e) => warn!("Skipping unreadable file {}: {:#}", path.display(), e),
        }
    }
    rows
}

/// Write all qualifying files of a group to `location`
///
/// The CSV goes to a temporary file next to `location` and is renamed into place
/// once complete, so an interrupted run never leaves a partial artifact behind.
pub fn write_group(location: &Path, files: &[PathBuf]) -> Result<WriteOutcome> {
    let rows = collect_rows(files);
    if rows.is_empty() {
        return Ok(WriteOutcome::NoQualifyingRows);
    }

    let parent = location
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    FileManager::ensure_dir(parent)?;

    let temp = artifact_temp_file(parent)
        .with_context(|| format!("Failed to create temporary file in {:?}", parent))?;
    {
        let mut csv_writer = csv::Writer::from_writer(temp.as_file());
        for row in &rows {
            csv_writer
                .serialize(row)
                .with_context(|| format!("Failed to serialize row for {}", row.filename))?;
        }
        csv_writer.flush().context("Failed to flush CSV writer")?;
    }
    temp.persist(location)
        .with_context(|| format!("Failed to move CSV into place: {:?}", location))?;

    Ok(WriteOutcome::Written { rows: rows.len() })
}

/// Temporary file in `dir` created with the mode a plain file would get
fn artifact_temp_file(dir: &Path) -> std::io::Result<NamedTempFile> {
    let mut builder = tempfile::Builder::new();
    builder.prefix(".dirtrans-");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        // umask still applies
        builder.permissions(std::fs::Permissions::from_mode(0o666));
    }
    builder.tempfile_in(dir)
}
