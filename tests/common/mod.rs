/*!
 * Common test utilities for the dirtrans test suite
 */

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use dirtrans::app_config::{Config, ProgressStyleKind, TranslationProvider};
use dirtrans::grouper::GroupedInput;


/// Route library log output through the test harness; safe to call repeatedly
pub fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file, and its parent folders, under `dir`
pub fn create_test_file(dir: &Path, relative_path: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(relative_path);
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// One file per key, named after the key
pub fn create_input_tree(dir: &Path, keys: &[&str]) -> Result<GroupedInput> {
    let mut files = Vec::new();
    for key in keys {
        files.push(create_test_file(dir, &format!("{}/notes.txt", key), key)?);
    }
    Ok(GroupedInput::from_files(files))
}

/// Valid configuration for the given roots that needs no API key and stays quiet
pub fn test_config(input_root: &Path, output_root: &Path) -> Config {
    let mut config = Config::new(input_root, output_root);
    config.translation.provider = TranslationProvider::Ollama;
    config.progress.style = ProgressStyleKind::Off;
    config
}

/// Read a CSV artifact as (filename, content) pairs
pub fn read_csv(path: &Path) -> Result<Vec<(String, String)>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push((record[0].to_string(), record[1].to_string()));
    }
    Ok(rows)
}
