/*!
 * Batch scheduler.
 *
 * Walks the grouped input in order and turns every key into at most one CSV
 * artifact. The run starts with a warm-up phase that translates one key at a
 * time until the first artifact write goes through, then switches to batches
 * driven by a shrinking size ladder:
 *
 * - a successful batch of effective size S advances the cursor by S and the
 *   next position starts again from the largest size
 * - a failed batch retries the same position with the next smaller size
 * - when every size failed, the key at the cursor is given up and the cursor
 *   advances by one
 *
 * Progress is published on a `watch` channel for the reporter.
 */

use log::{debug, error, info, warn};
use std::fmt;
use std::path::PathBuf;
use tokio::sync::watch;

use crate::database::CheckpointStore;
use crate::grouper::GroupedInput;
use crate::output::OutputResolver;
use crate::translation::Translator;
use crate::writer::{self, WriteOutcome};

/// Scheduler state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Warmup,
    Batch,
    Done,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Warmup => write!(f, "WARMUP"),
            Phase::Batch => write!(f, "BATCH"),
            Phase::Done => write!(f, "DONE"),
        }
    }
}

/// Snapshot published after every phase change and step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerStatus {
    pub phase: Phase,
    pub cursor: usize,
    pub total: usize,
    /// Human-readable description of the current step
    pub activity: String,
}

impl SchedulerStatus {
    fn initial(phase: Phase, cursor: usize, total: usize) -> Self {
        Self {
            phase,
            cursor,
            total,
            activity: "starting".to_string(),
        }
    }
}

/// Offset into the ordered key list; only moves forward, never past the end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineCursor {
    position: usize,
    total: usize,
}

impl PipelineCursor {
    /// Cursor at `start`, clamped to `total`
    pub fn new(start: usize, total: usize) -> Self {
        Self {
            position: start.min(total),
            total,
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Keys left to visit
    pub fn remaining(&self) -> usize {
        self.total - self.position
    }

    pub fn is_finished(&self) -> bool {
        self.position >= self.total
    }

    /// Move forward by `step`, stopping at the end
    pub fn advance(&mut self, step: usize) {
        self.position = self.position.saturating_add(step).min(self.total);
    }
}

/// Per-run counts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Artifacts created
    pub written: usize,
    /// Keys whose artifact already existed
    pub duplicates: usize,
    /// Keys translated to an empty label
    pub empty_labels: usize,
    /// Keys translated to a non-ASCII label
    pub non_ascii: usize,
    /// Keys with no ASCII-named file to write
    pub no_rows: usize,
    /// Keys whose artifact could not be written
    pub write_errors: usize,
    /// Keys given up after the whole ladder failed
    pub failed: usize,
    /// Final cursor
    pub cursor: usize,
    /// Key count
    pub total: usize,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} keys visited: {} written, {} duplicate, {} empty label, {} non-ASCII, {} without rows, {} write errors, {} failed",
            self.cursor,
            self.total,
            self.written,
            self.duplicates,
            self.empty_labels,
            self.non_ascii,
            self.no_rows,
            self.write_errors,
            self.failed
        )
    }
}

/// What happened to one (key, label) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyOutcome {
    Written,
    Duplicate,
    EmptyLabel,
    NonAscii,
    NoRows,
    WriteError,
}

/// Default batch ladder
pub const DEFAULT_BATCH_SIZES: [usize; 6] = [200, 100, 50, 20, 5, 1];

/// Drives translation and writing over the whole key list
pub struct BatchScheduler<T: Translator> {
    translator: T,
    input: GroupedInput,
    resolver: OutputResolver,
    ladder: Vec<usize>,
    cursor: PipelineCursor,
    phase: Phase,
    status: watch::Sender<SchedulerStatus>,
    checkpoint: Option<CheckpointStore>,
    summary: RunSummary,
}

impl<T: Translator> BatchScheduler<T> {
    /// New scheduler starting at `start` (clamped to the key count)
    ///
    /// Zero sizes are dropped from `ladder`; an empty ladder becomes `[1]`.
    pub fn new(
        translator: T,
        input: GroupedInput,
        resolver: OutputResolver,
        ladder: &[usize],
        start: usize,
    ) -> Self {
        let cursor = PipelineCursor::new(start, input.len());
        let phase = if cursor.is_finished() { Phase::Done } else { Phase::Warmup };
        let (status, _) = watch::channel(SchedulerStatus::initial(phase, cursor.position(), cursor.total()));

        Self {
            translator,
            input,
            resolver,
            ladder: normalize_ladder(ladder),
            cursor,
            phase,
            status,
            checkpoint: None,
            summary: RunSummary::default(),
        }
    }

    /// Persist progress into `store` as the run goes
    pub fn with_checkpoint(mut self, store: CheckpointStore) -> Self {
        self.checkpoint = Some(store);
        self
    }

    /// Receiver for status snapshots
    pub fn subscribe(&self) -> watch::Receiver<SchedulerStatus> {
        self.status.subscribe()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn cursor(&self) -> usize {
        self.cursor.position()
    }

    /// Effective ladder after normalization
    pub fn ladder(&self) -> &[usize] {
        &self.ladder
    }

    /// Counts so far
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            cursor: self.cursor.position(),
            total: self.cursor.total(),
            ..self.summary.clone()
        }
    }

    /// Run until every key was visited
    pub async fn run(&mut self) -> RunSummary {
        info!(
            "Starting at key {}/{} with batch ladder {:?}",
            self.cursor.position(),
            self.cursor.total(),
            self.ladder
        );

        while self.step().await != Phase::Done {}

        let summary = self.summary();
        info!("Run finished: {}", summary);
        summary
    }

    /// Handle one warm-up key or one batch position
    pub async fn step(&mut self) -> Phase {
        if self.cursor.is_finished() {
            self.finish();
            return self.phase;
        }

        match self.phase {
            Phase::Warmup => self.warmup_step().await,
            Phase::Batch => self.batch_step().await,
            Phase::Done => {}
        }

        if self.cursor.is_finished() {
            self.finish();
        }
        self.phase
    }

    async fn warmup_step(&mut self) {
        let position = self.cursor.position();
        let key = self.input.keys()[position].clone();
        self.publish(format!("warm-up: translating '{}'", key));

        let label = self.translator.translate_single(&key).await;
        let outcome = self.process(&key, &label).await;

        self.advance(1).await;

        // Any write attempt that did not fail on I/O ends the warm-up
        if matches!(outcome, KeyOutcome::Written | KeyOutcome::NoRows) {
            info!("Warm-up complete after key {}, switching to batches", position);
            self.phase = Phase::Batch;
            self.publish("switching to batches".to_string());
        }
    }

    async fn batch_step(&mut self) {
        let start = self.cursor.position();
        let sizes = effective_sizes(&self.ladder, self.cursor.remaining());

        for size in sizes {
            let keys = self.input.keys()[start..start + size].to_vec();
            self.publish(format!("batch of {} at key {}", size, start));

            match self.translator.translate_batch(&keys).await {
                Some(labels) if labels.len() == keys.len() => {
                    for (key, label) in keys.iter().zip(labels.iter()) {
                        self.process(key, label).await;
                    }
                    self.advance(size).await;
                    return;
                }
                Some(labels) => {
                    warn!(
                        "Batch of {} at key {} returned {} labels, shrinking",
                        size,
                        start,
                        labels.len()
                    );
                }
                None => debug!("Batch of {} at key {} failed, shrinking", size, start),
            }
        }

        error!(
            "Every batch size failed at key {} ('{}'), skipping it",
            start,
            self.input.keys()[start]
        );
        self.summary.failed += 1;
        self.advance(1).await;
    }

    /// Validate a label, then write its artifact unless it already exists
    async fn process(&mut self, key: &str, label: &str) -> KeyOutcome {
        let outcome = if label.is_empty() {
            warn!("No translation for '{}', skipping", key);
            KeyOutcome::EmptyLabel
        } else if !label.is_ascii() {
            warn!("Translation of '{}' is not ASCII ('{}'), skipping", key, label);
            KeyOutcome::NonAscii
        } else {
            let location = self.resolver.resolve(label);
            if location.exists() {
                info!("'{}' -> '{}' already exists at {}, skipping", key, label, location.display());
                KeyOutcome::Duplicate
            } else {
                self.write(key, label, location).await
            }
        };

        match outcome {
            KeyOutcome::Written => self.summary.written += 1,
            KeyOutcome::Duplicate => self.summary.duplicates += 1,
            KeyOutcome::EmptyLabel => self.summary.empty_labels += 1,
            KeyOutcome::NonAscii => self.summary.non_ascii += 1,
            KeyOutcome::NoRows => self.summary.no_rows += 1,
            KeyOutcome::WriteError => self.summary.write_errors += 1,
        }
        outcome
    }

    async fn write(&mut self, key: &str, label: &str, location: PathBuf) -> KeyOutcome {
        match writer::write_group(&location, self.input.files(key)) {
            Ok(WriteOutcome::Written { rows }) => {
                info!("'{}' -> '{}': wrote {} rows to {}", key, label, rows, location.display());
                if let Some(store) = &self.checkpoint {
                    if let Err(e) = store.record_label(label, &location).await {
                        warn!("Failed to record '{}' in checkpoint: {:#}", label, e);
                    }
                }
                KeyOutcome::Written
            }
            Ok(WriteOutcome::NoQualifyingRows) => {
                info!("'{}' -> '{}': no file with an ASCII name, nothing written", key, label);
                KeyOutcome::NoRows
            }
            Err(e) => {
                error!("Failed to write {} for '{}': {:#}", location.display(), key, e);
                KeyOutcome::WriteError
            }
        }
    }

    async fn advance(&mut self, step: usize) {
        self.cursor.advance(step);
        if let Some(store) = &self.checkpoint {
            if let Err(e) = store.save_cursor(self.cursor.position(), self.cursor.total()).await {
                warn!("Failed to save checkpoint at {}: {:#}", self.cursor.position(), e);
            }
        }
    }

    fn finish(&mut self) {
        if self.phase != Phase::Done {
            self.phase = Phase::Done;
            self.publish("done".to_string());
        }
    }

    fn publish(&self, activity: String) {
        self.status.send_replace(SchedulerStatus {
            phase: self.phase,
            cursor: self.cursor.position(),
            total: self.cursor.total(),
            activity,
        });
    }
}

fn normalize_ladder(ladder: &[usize]) -> Vec<usize> {
    let sizes: Vec<usize> = ladder.iter().copied().filter(|&size| size > 0).collect();
    if sizes.is_empty() { vec![1] } else { sizes }
}

/// Sizes to try at one position: clamped to what is left, each sent at most once
fn effective_sizes(ladder: &[usize], remaining: usize) -> Vec<usize> {
    let mut sizes: Vec<usize> = Vec::with_capacity(ladder.len());
    for size in ladder.iter().map(|&size| size.min(remaining)) {
        if size > 0 && !sizes.contains(&size) {
            sizes.push(size);
        }
    }
    sizes
}
