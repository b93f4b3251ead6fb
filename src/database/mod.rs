/*!
 * Database module for checkpoint persistence.
 *
 * A checkpoint records, per (input root, output root) pair, how far the
 * scheduler got and which labels it has written, so an interrupted run can
 * pick up where it stopped with `--resume`.
 */

pub mod schema;
pub mod connection;
pub mod repository;
pub mod models;

// Re-export main types
pub use connection::{DatabaseConnection, DatabaseStats};
pub use models::{CheckpointRecord, CompletedLabelRecord};
pub use repository::{run_key, CheckpointStore};
