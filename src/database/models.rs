/*!
 * Database entity models.
 *
 * These structures map directly to the checkpoint tables.
 */

use serde::{Deserialize, Serialize};
use std::fmt;

/// Saved scheduler position for one (input root, output root) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointRecord {
    /// SHA-256 of both roots
    pub run_key: String,
    /// Input root as given on the command line or in the config
    pub input_root: String,
    /// Output root as given on the command line or in the config
    pub output_root: String,
    /// Next key index to process
    pub cursor: i64,
    /// Key count when the checkpoint was written
    pub total: i64,
    /// RFC 3339 timestamp
    pub updated_at: String,
}

impl CheckpointRecord {
    /// Cursor as an index, negative values read as 0
    pub fn cursor_index(&self) -> usize {
        usize::try_from(self.cursor).unwrap_or(0)
    }

    /// Whether every key was visited when the checkpoint was written
    pub fn is_finished(&self) -> bool {
        self.total > 0 && self.cursor >= self.total
    }
}

impl fmt::Display for CheckpointRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {}: {}/{} (updated {})",
            self.input_root, self.output_root, self.cursor, self.total, self.updated_at
        )
    }
}

/// A label written during a checkpointed run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedLabelRecord {
    /// Translated label
    pub label: String,
    /// Path of the CSV artifact
    pub location: String,
    /// RFC 3339 timestamp
    pub written_at: String,
}
