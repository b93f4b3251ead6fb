/*!
 * Integration tests for checkpoint persistence and resume
 */

use anyhow::Result;
use std::path::Path;

use dirtrans::app_config::Config;
use dirtrans::app_controller::Controller;

use crate::common::{self, mock_translator::MockTranslator};

fn checkpointed_config(input: &Path, output: &Path, db_dir: &Path) -> Config {
    let mut config = common::test_config(input, output);
    config.checkpoint.enabled = true;
    config.checkpoint.path = Some(db_dir.join("checkpoints.db"));
    config
}

#[tokio::test]
async fn test_run_withCheckpointEnabled_shouldRecordProgress() -> Result<()> {
    common::init_test_logging();
    let input = common::create_temp_dir()?;
    let output = common::create_temp_dir()?;
    let db_dir = common::create_temp_dir()?;
    common::create_input_tree(input.path(), &["alpha", "beta"])?;

    let controller = Controller::with_config(checkpointed_config(input.path(), output.path(), db_dir.path()))?;
    controller.run_with_translator(MockTranslator::new(), false).await?;

    let (record, labels) = controller.checkpoint_status().await?.expect("checkpoint missing");
    assert_eq!(record.cursor, 2);
    assert_eq!(record.total, 2);
    assert!(record.is_finished());
    assert_eq!(labels.len(), 2);
    assert!(db_dir.path().join("checkpoints.db").exists());
    Ok(())
}

#[tokio::test]
async fn test_run_withResume_shouldStartAtSavedCursor() -> Result<()> {
    let input = common::create_temp_dir()?;
    let output = common::create_temp_dir()?;
    let db_dir = common::create_temp_dir()?;
    common::create_input_tree(input.path(), &["alpha", "beta", "gamma"])?;

    let controller = Controller::with_config(checkpointed_config(input.path(), output.path(), db_dir.path()))?;
    controller.open_checkpoint()?.save_cursor(2, 3).await?;

    let translator = MockTranslator::new();
    let summary = controller.run_with_translator(translator.clone(), true).await?;

    assert_eq!(summary.written, 1);
    assert_eq!(translator.single_count(), 1);
    assert!(!output.path().join("alpha.csv").exists());
    assert!(!output.path().join("beta.csv").exists());
    assert!(output.path().join("gamma.csv").exists());
    Ok(())
}

#[tokio::test]
async fn test_run_withResumeButNoCheckpoint_shouldUseResumeIndex() -> Result<()> {
    let input = common::create_temp_dir()?;
    let output = common::create_temp_dir()?;
    let db_dir = common::create_temp_dir()?;
    common::create_input_tree(input.path(), &["alpha", "beta"])?;

    let mut config = checkpointed_config(input.path(), output.path(), db_dir.path());
    config.resume_index = 1;
    let controller = Controller::with_config(config)?;

    let summary = controller.run_with_translator(MockTranslator::new(), true).await?;

    assert_eq!(summary.written, 1);
    assert!(output.path().join("beta.csv").exists());
    Ok(())
}

#[tokio::test]
async fn test_clearCheckpoint_shouldForgetProgress() -> Result<()> {
    let input = common::create_temp_dir()?;
    let output = common::create_temp_dir()?;
    let db_dir = common::create_temp_dir()?;
    common::create_input_tree(input.path(), &["alpha"])?;

    let controller = Controller::with_config(checkpointed_config(input.path(), output.path(), db_dir.path()))?;
    controller.run_with_translator(MockTranslator::new(), false).await?;

    assert!(controller.clear_checkpoint().await?);
    assert!(controller.checkpoint_status().await?.is_none());
    assert!(!controller.clear_checkpoint().await?);
    Ok(())
}

#[tokio::test]
async fn test_checkpointStats_shouldCountSavedRunsAndLabels() -> Result<()> {
    let input = common::create_temp_dir()?;
    let output = common::create_temp_dir()?;
    let db_dir = common::create_temp_dir()?;
    common::create_input_tree(input.path(), &["alpha", "beta"])?;

    let controller = Controller::with_config(checkpointed_config(input.path(), output.path(), db_dir.path()))?;
    controller.run_with_translator(MockTranslator::new(), false).await?;

    let stats = controller.checkpoint_stats()?;
    assert_eq!(stats.checkpoint_count, 1);
    assert_eq!(stats.label_count, 2);
    assert!(stats.file_size_bytes > 0);
    assert!(stats.to_string().starts_with("Checkpoints: 1, Completed labels: 2"));
    Ok(())
}
