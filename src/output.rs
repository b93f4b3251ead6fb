/*!
 * Output location resolution.
 *
 * A translated label decides where its CSV lives. A `/` in the label opens one
 * level of subdirectory (`"Sports/Football"` -> `<root>/Sports/Football.csv`);
 * any further separator is folded into the file name.
 */

use std::path::PathBuf;

/// Extension of every artifact
pub const OUTPUT_EXTENSION: &str = "csv";

/// Maps labels to artifact paths under one output root
#[derive(Debug, Clone)]
pub struct OutputResolver {
    root: PathBuf,
}

impl OutputResolver {
    /// Resolve labels under `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Artifact path for `label`; pure and deterministic
    pub fn resolve(&self, label: &str) -> PathBuf {
        match label.split_once('/') {
            Some((directory, rest)) => {
                let file_name = format!("{}.{}", flatten_separators(rest.trim()), OUTPUT_EXTENSION);
                match sanitize_directory(directory.trim()) {
                    Some(directory) => self.root.join(directory).join(file_name),
                    None => self.root.join(file_name),
                }
            }
            None => self.root.join(format!("{}.{}", flatten_separators(label), OUTPUT_EXTENSION)),
        }
    }
}

/// Rewrite both path separators to underscores
fn flatten_separators(text: &str) -> String {
    text.replace(['/', '\\'], "_")
}

/// Directory component that stays inside the root, or `None` for "no directory"
fn sanitize_directory(directory: &str) -> Option<String> {
    match directory {
        "" => None,
        "." | ".." => Some("_".to_string()),
        other => Some(other.replace('\\', "_")),
    }
}
