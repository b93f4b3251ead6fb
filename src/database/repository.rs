/*!
 * Checkpoint repository.
 *
 * Wraps the SQL for one run's checkpoint behind a small async API. A run is
 * identified by a SHA-256 of its input and output roots, so the same pair of
 * directories always maps to the same checkpoint.
 */

use anyhow::Result;
use chrono::Utc;
use log::debug;
use rusqlite::{params, Connection, OptionalExtension};
use sha2::{Digest, Sha256};
use std::path::Path;

use super::connection::DatabaseConnection;
use super::models::{CheckpointRecord, CompletedLabelRecord};

/// Stable identifier for an (input root, output root) pair
pub fn run_key(input_root: &Path, output_root: &Path) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input_root.to_string_lossy().as_bytes());
    hasher.update([0u8]);
    hasher.update(output_root.to_string_lossy().as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Checkpoint access for one run
#[derive(Clone)]
pub struct CheckpointStore {
    db: DatabaseConnection,
    run_key: String,
    input_root: String,
    output_root: String,
}

impl CheckpointStore {
    /// Bind a store to the run identified by the two roots
    pub fn new(db: DatabaseConnection, input_root: &Path, output_root: &Path) -> Self {
        Self {
            db,
            run_key: run_key(input_root, output_root),
            input_root: input_root.to_string_lossy().into_owned(),
            output_root: output_root.to_string_lossy().into_owned(),
        }
    }

    /// Open the database at `path` and bind it to the run
    pub fn open(path: &Path, input_root: &Path, output_root: &Path) -> Result<Self> {
        let db = DatabaseConnection::new(path)?;
        Ok(Self::new(db, input_root, output_root))
    }

    /// Store backed by an in-memory database (for testing)
    pub fn in_memory(input_root: &Path, output_root: &Path) -> Result<Self> {
        let db = DatabaseConnection::new_in_memory()?;
        Ok(Self::new(db, input_root, output_root))
    }

    pub fn run_key(&self) -> &str {
        &self.run_key
    }

    /// Underlying connection
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Saved checkpoint for this run, if any
    pub async fn load(&self) -> Result<Option<CheckpointRecord>> {
        let run_key = self.run_key.clone();
        self.db
            .execute_async(move |conn| Self::load_sync(conn, &run_key))
            .await
    }

    fn load_sync(conn: &Connection, run_key: &str) -> Result<Option<CheckpointRecord>> {
        let record = conn
            .query_row(
                r#"
                SELECT run_key, input_root, output_root, cursor, total, updated_at
                FROM checkpoints WHERE run_key = ?1
                "#,
                [run_key],
                |row| {
                    Ok(CheckpointRecord {
                        run_key: row.get(0)?,
                        input_root: row.get(1)?,
                        output_root: row.get(2)?,
                        cursor: row.get(3)?,
                        total: row.get(4)?,
                        updated_at: row.get(5)?,
                    })
                },
            )
            .optional()?;
        Ok(record)
    }

    /// Saved cursor, `None` when the run was never checkpointed
    pub async fn load_cursor(&self) -> Result<Option<usize>> {
        Ok(self.load().await?.map(|record| record.cursor_index()))
    }

    /// Persist the cursor after an advance
    pub async fn save_cursor(&self, cursor: usize, total: usize) -> Result<()> {
        let run_key = self.run_key.clone();
        let input_root = self.input_root.clone();
        let output_root = self.output_root.clone();
        let cursor = i64::try_from(cursor)?;
        let total = i64::try_from(total)?;

        self.db
            .execute_async(move |conn| {
                conn.execute(
                    r#"
                    INSERT INTO checkpoints (run_key, input_root, output_root, cursor, total, updated_at)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                    ON CONFLICT(run_key) DO UPDATE SET
                        cursor = excluded.cursor,
                        total = excluded.total,
                        updated_at = excluded.updated_at
                    "#,
                    params![run_key, input_root, output_root, cursor, total, Utc::now().to_rfc3339()],
                )?;
                debug!("Checkpoint saved at {}/{}", cursor, total);
                Ok(())
            })
            .await
    }

    /// Record a written label and where its artifact went
    pub async fn record_label(&self, label: &str, location: &Path) -> Result<()> {
        let run_key = self.run_key.clone();
        let input_root = self.input_root.clone();
        let output_root = self.output_root.clone();
        let label = label.to_string();
        let location = location.to_string_lossy().into_owned();

        self.db
            .transaction_async(move |tx| {
                let now = Utc::now().to_rfc3339();
                tx.execute(
                    r#"
                    INSERT OR IGNORE INTO checkpoints (run_key, input_root, output_root, cursor, total, updated_at)
                    VALUES (?1, ?2, ?3, 0, 0, ?4)
                    "#,
                    params![run_key, input_root, output_root, now],
                )?;
                tx.execute(
                    r#"
                    INSERT OR REPLACE INTO completed_labels (run_key, label, location, written_at)
                    VALUES (?1, ?2, ?3, ?4)
                    "#,
                    params![run_key, label, location, now],
                )?;
                Ok(())
            })
            .await
    }

    /// Labels written so far, oldest first
    pub async fn completed_labels(&self) -> Result<Vec<CompletedLabelRecord>> {
        let run_key = self.run_key.clone();
        self.db
            .execute_async(move |conn| {
                let mut stmt = conn.prepare(
                    r#"
                    SELECT label, location, written_at FROM completed_labels
                    WHERE run_key = ?1 ORDER BY written_at, label
                    "#,
                )?;
                let rows = stmt.query_map([&run_key], |row| {
                    Ok(CompletedLabelRecord {
                        label: row.get(0)?,
                        location: row.get(1)?,
                        written_at: row.get(2)?,
                    })
                })?;
                Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
            })
            .await
    }

    /// Drop the checkpoint and its labels; returns whether one existed
    pub async fn clear(&self) -> Result<bool> {
        let run_key = self.run_key.clone();
        self.db
            .transaction_async(move |tx| {
                tx.execute("DELETE FROM completed_labels WHERE run_key = ?1", [&run_key])?;
                let removed = tx.execute("DELETE FROM checkpoints WHERE run_key = ?1", [&run_key])?;
                Ok(removed > 0)
            })
            .await
    }
}
