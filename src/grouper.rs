/*!
 * Input grouping.
 *
 * Every text file under the input root belongs to the group named after its
 * immediate parent directory. Groups with the same directory name in different
 * places are merged. Keys come out in case-insensitive order, which fixes the
 * order the scheduler walks and therefore what a resume index means.
 */

use log::{info, warn};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::errors::AppError;
use crate::file_utils::FileManager;

/// Work keys in scheduling order plus the files behind each key
#[derive(Debug, Clone, Default)]
pub struct GroupedInput {
    keys: Vec<String>,
    groups: HashMap<String, Vec<PathBuf>>,
}

impl GroupedInput {
    /// Build from a list of file paths
    pub fn from_files(files: impl IntoIterator<Item = PathBuf>) -> Self {
        let mut groups: HashMap<String, Vec<PathBuf>> = HashMap::new();
        for path in files {
            // A lossy key would merge distinct folders
            let key = match path.parent().and_then(Path::file_name) {
                Some(name) => match name.to_str() {
                    Some(name) => name.to_string(),
                    None => {
                        warn!("Skipping {}: folder name is not valid UTF-8", path.display());
                        continue;
                    }
                },
                None => String::new(),
            };
            groups.entry(key).or_default().push(path);
        }

        for files in groups.values_mut() {
            files.sort_by_cached_key(|path| path.to_string_lossy().to_lowercase());
        }

        let mut keys: Vec<String> = groups.keys().cloned().collect();
        keys.sort_by(|a, b| a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b)));

        Self { keys, groups }
    }

    /// Keys in scheduling order
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Files of one group, empty for an unknown key
    pub fn files(&self, key: &str) -> &[PathBuf] {
        self.groups.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of groups
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether no file was found
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Total number of files across groups
    pub fn file_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }
}

/// Scan `root` for files with `extension` and group them by parent directory name
pub fn group(root: &Path, extension: &str) -> Result<GroupedInput, AppError> {
    if !FileManager::dir_exists(root) {
        return Err(AppError::File(format!(
            "Input root does not exist or is not a directory: {}",
            root.display()
        )));
    }

    let files = FileManager::find_files(root, extension)
        .map_err(|e| AppError::File(format!("Failed to scan {}: {:#}", root.display(), e)))?;

    let grouped = GroupedInput::from_files(files);
    info!(
        "Found {} .{} files in {} distinct folders under {}",
        grouped.file_count(),
        extension.trim_start_matches('.'),
        grouped.len(),
        root.display()
    );
    Ok(grouped)
}
