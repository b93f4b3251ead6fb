/*!
 * End-to-end tests: input tree -> grouping -> translation -> CSV output
 */

use anyhow::Result;
use std::fs;

use dirtrans::app_controller::Controller;
use dirtrans::grouper;
use dirtrans::output::OutputResolver;
use dirtrans::scheduler::{BatchScheduler, Phase, DEFAULT_BATCH_SIZES};

use crate::common::{self, mock_translator::MockTranslator};

#[tokio::test]
async fn test_run_withGreekAndAsciiFolders_shouldWriteOneCsvPerLabel() -> Result<()> {
    common::init_test_logging();
    let input = common::create_temp_dir()?;
    let output = common::create_temp_dir()?;
    common::create_test_file(input.path(), "2020/Αθλητισμός/b.txt", "second")?;
    common::create_test_file(input.path(), "2021/Αθλητισμός/A.txt", "first")?;
    common::create_test_file(input.path(), "2021/Αθλητισμός/c.txt", "third, with comma")?;
    common::create_test_file(input.path(), "2021/Αθλητισμός/Ιστορία.txt", "not ascii")?;
    common::create_test_file(input.path(), "sport history/notes.txt", "olympics\n1896")?;
    common::create_test_file(input.path(), "sport history/ignored.md", "other extension")?;

    let controller = Controller::with_config(common::test_config(input.path(), output.path()))?;
    let translator = MockTranslator::new().with_translation("Αθλητισμός", "Athletics");

    let summary = controller.run_with_translator(translator.clone(), false).await?;

    assert_eq!(summary.total, 2);
    assert_eq!(summary.cursor, 2);
    assert_eq!(summary.written, 2);

    // "sport history" sorts first and is handled during warm-up
    assert_eq!(translator.single_count(), 1);
    assert_eq!(translator.batch_sizes(), vec![1]);

    let athletics = common::read_csv(&output.path().join("Athletics.csv"))?;
    let names: Vec<&str> = athletics.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(names, vec!["b.txt", "A.txt", "c.txt"]);
    assert_eq!(athletics[2].1, "third, with comma");

    let history = common::read_csv(&output.path().join("sport history.csv"))?;
    assert_eq!(history, vec![("notes.txt".to_string(), "olympics\n1896".to_string())]);
    Ok(())
}

#[tokio::test]
async fn test_pipeline_overGroupedTree_shouldFinishInDoneState() -> Result<()> {
    let input = common::create_temp_dir()?;
    let output = common::create_temp_dir()?;
    common::create_test_file(input.path(), "2021/Αθλητισμός/a.txt", "first")?;
    common::create_test_file(input.path(), "Ιστορία/b.txt", "second")?;
    common::create_test_file(input.path(), "misc/c.txt", "third")?;

    let grouped = grouper::group(input.path(), "txt")?;
    let translator = MockTranslator::new()
        .with_translation("Αθλητισμός", "Athletics")
        .with_translation("Ιστορία", "History");
    let mut scheduler = BatchScheduler::new(
        translator,
        grouped,
        OutputResolver::new(output.path()),
        &DEFAULT_BATCH_SIZES,
        0,
    );
    let status = scheduler.subscribe();

    let summary = scheduler.run().await;

    assert_eq!(scheduler.phase(), Phase::Done);
    assert_eq!(status.borrow().phase, Phase::Done);
    assert_eq!(summary.cursor, 3);
    assert_eq!(summary.written, 3);
    for label in ["Athletics", "History", "misc"] {
        assert!(output.path().join(format!("{}.csv", label)).exists());
    }
    Ok(())
}

#[tokio::test]
async fn test_run_withSlashInLabel_shouldCreateOneSubdirectory() -> Result<()> {
    let input = common::create_temp_dir()?;
    let output = common::create_temp_dir()?;
    common::create_test_file(input.path(), "Ποδόσφαιρο/rules.txt", "offside")?;

    let controller = Controller::with_config(common::test_config(input.path(), output.path()))?;
    let translator = MockTranslator::new().with_translation("Ποδόσφαιρο", "Sports/Football/Rules");

    controller.run_with_translator(translator, false).await?;

    assert!(output.path().join("Sports").join("Football_Rules.csv").exists());
    Ok(())
}

#[tokio::test]
async fn test_run_withResumeIndex_shouldSkipEarlierKeys() -> Result<()> {
    let input = common::create_temp_dir()?;
    let output = common::create_temp_dir()?;
    common::create_input_tree(input.path(), &["alpha", "beta", "gamma"])?;

    let mut config = common::test_config(input.path(), output.path());
    config.resume_index = 1;
    let controller = Controller::with_config(config)?;

    let summary = controller.run_with_translator(MockTranslator::new(), false).await?;

    assert_eq!(summary.written, 2);
    assert!(!output.path().join("alpha.csv").exists());
    assert!(output.path().join("beta.csv").exists());
    assert!(output.path().join("gamma.csv").exists());
    Ok(())
}

#[tokio::test]
async fn test_run_withCustomExtension_shouldOnlyPickMatchingFiles() -> Result<()> {
    let input = common::create_temp_dir()?;
    let output = common::create_temp_dir()?;
    common::create_test_file(input.path(), "docs/readme.MD", "upper")?;
    common::create_test_file(input.path(), "docs/skip.txt", "no")?;

    let mut config = common::test_config(input.path(), output.path());
    config.file_extension = "md".to_string();
    let controller = Controller::with_config(config)?;

    controller.run_with_translator(MockTranslator::new(), false).await?;

    let rows = common::read_csv(&output.path().join("docs.csv"))?;
    assert_eq!(rows, vec![("readme.MD".to_string(), "upper".to_string())]);
    Ok(())
}

#[tokio::test]
async fn test_run_withEmptyInput_shouldFinishWithoutOutput() -> Result<()> {
    let input = common::create_temp_dir()?;
    let output = common::create_temp_dir()?;

    let controller = Controller::with_config(common::test_config(input.path(), output.path()))?;
    let translator = MockTranslator::new();
    let summary = controller.run_with_translator(translator.clone(), false).await?;

    assert_eq!(summary.total, 0);
    assert!(translator.calls().is_empty());
    assert_eq!(fs::read_dir(output.path())?.count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_run_withMissingInputRoot_shouldFail() -> Result<()> {
    let scratch = common::create_temp_dir()?;
    let controller = Controller::with_config(common::test_config(
        &scratch.path().join("missing"),
        &scratch.path().join("out"),
    ))?;

    let result = controller.run_with_translator(MockTranslator::new(), false).await;

    assert!(result.is_err());
    assert!(!scratch.path().join("out").exists());
    Ok(())
}

#[test]
fn test_withConfig_withoutRequiredApiKey_shouldFail() {
    let mut config = common::test_config(std::path::Path::new("in"), std::path::Path::new("out"));
    config.translation.provider = dirtrans::app_config::TranslationProvider::OpenAI;

    assert!(Controller::with_config(config).is_err());
}
