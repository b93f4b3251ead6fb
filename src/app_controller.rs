use anyhow::{Context, Result};
use log::{info, warn};

use crate::app_config::Config;
use crate::database::{CheckpointRecord, CheckpointStore, CompletedLabelRecord, DatabaseStats};
use crate::grouper;
use crate::output::OutputResolver;
use crate::reporter::ProgressReporter;
use crate::scheduler::{BatchScheduler, RunSummary};
use crate::translation::{TranslationClient, Translator};

// @module: Application controller wiring grouping, translation, writing and reporting

/// Main application controller
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().context("Configuration validation failed")?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the whole pipeline against the configured provider
    ///
    /// With `resume_from_checkpoint` the saved cursor replaces `resume_index`.
    pub async fn run(&self, resume_from_checkpoint: bool) -> Result<RunSummary> {
        let client = TranslationClient::from_config(&self.config)?;
        info!(
            "Translating folder names with {} ({}) into {}",
            client.provider_name(),
            client.model(),
            self.config.target_language
        );
        self.run_with_translator(client, resume_from_checkpoint).await
    }

    /// Run the whole pipeline with any translator
    pub async fn run_with_translator<T: Translator>(
        &self,
        translator: T,
        resume_from_checkpoint: bool,
    ) -> Result<RunSummary> {
        let input = grouper::group(&self.config.input_root, &self.config.file_extension)?;

        let store = if self.config.checkpoint.enabled || resume_from_checkpoint {
            Some(self.open_checkpoint()?)
        } else {
            None
        };

        let start = match (&store, resume_from_checkpoint) {
            (Some(store), true) => match store.load_cursor().await? {
                Some(cursor) => {
                    info!("Resuming from checkpoint at key {}", cursor);
                    cursor
                }
                None => {
                    warn!(
                        "No checkpoint saved for these roots, starting at key {}",
                        self.config.resume_index
                    );
                    self.config.resume_index
                }
            },
            _ => self.config.resume_index,
        };

        let mut scheduler = BatchScheduler::new(
            translator,
            input,
            OutputResolver::new(&self.config.output_root),
            &self.config.scheduler.batch_sizes,
            start,
        );
        if let Some(store) = store {
            scheduler = scheduler.with_checkpoint(store);
        }

        let reporter = ProgressReporter::from_config(&self.config.progress).spawn(scheduler.subscribe());

        let summary = scheduler.run().await;
        drop(scheduler);

        if let Some(handle) = reporter {
            if let Err(e) = handle.await {
                warn!("Progress reporter stopped abnormally: {}", e);
            }
        }

        Ok(summary)
    }

    /// Checkpoint store bound to the configured roots
    pub fn open_checkpoint(&self) -> Result<CheckpointStore> {
        let path = self.config.checkpoint_path()?;
        CheckpointStore::open(&path, &self.config.input_root, &self.config.output_root)
            .with_context(|| format!("Failed to open checkpoint database: {}", path.display()))
    }

    /// Saved checkpoint and written labels for the configured roots
    pub async fn checkpoint_status(&self) -> Result<Option<(CheckpointRecord, Vec<CompletedLabelRecord>)>> {
        let store = self.open_checkpoint()?;
        match store.load().await? {
            Some(record) => Ok(Some((record, store.completed_labels().await?))),
            None => Ok(None),
        }
    }

    /// Size of the checkpoint database across all roots
    pub fn checkpoint_stats(&self) -> Result<DatabaseStats> {
        self.open_checkpoint()?.connection().stats()
    }

    /// Forget the checkpoint for the configured roots
    pub async fn clear_checkpoint(&self) -> Result<bool> {
        self.open_checkpoint()?.clear().await
    }
}
