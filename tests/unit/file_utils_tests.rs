/*!
 * Tests for file utilities and input grouping
 */

use std::path::PathBuf;

use dirtrans::file_utils::FileManager;
use dirtrans::grouper;

use crate::common;

#[test]
fn test_findFiles_shouldRecurseAndMatchExtensionCaseInsensitively() {
    let dir = common::create_temp_dir().unwrap();
    common::create_test_file(dir.path(), "a/one.txt", "1").unwrap();
    common::create_test_file(dir.path(), "a/b/two.TXT", "2").unwrap();
    common::create_test_file(dir.path(), "a/three.csv", "3").unwrap();
    common::create_test_file(dir.path(), "noext", "4").unwrap();

    let mut found = FileManager::find_files(dir.path(), ".txt").unwrap();
    found.sort();

    assert_eq!(found, vec![dir.path().join("a/b/two.TXT"), dir.path().join("a/one.txt")]);
}

#[test]
fn test_readToStringLossy_shouldSkipInvalidBytes() {
    let dir = common::create_temp_dir().unwrap();
    let path = dir.path().join("latin1.txt");
    std::fs::write(&path, b"caf\xE9 ok").unwrap();

    assert_eq!(FileManager::read_to_string_lossy(&path).unwrap(), "caf ok");
    assert!(FileManager::read_to_string_lossy(dir.path().join("missing.txt")).is_err());
}

#[test]
fn test_ensureDir_shouldCreateNestedDirectories() {
    let dir = common::create_temp_dir().unwrap();
    let nested = dir.path().join("x/y/z");

    FileManager::ensure_dir(&nested).unwrap();
    FileManager::ensure_dir(&nested).unwrap();

    assert!(FileManager::dir_exists(&nested));
    assert!(!FileManager::file_exists(&nested));
}

#[test]
fn test_group_shouldMergeSameFolderNamesFromDifferentPlaces() {
    let dir = common::create_temp_dir().unwrap();
    common::create_test_file(dir.path(), "2020/Ιστορία/b.txt", "b").unwrap();
    common::create_test_file(dir.path(), "2021/Ιστορία/a.txt", "a").unwrap();
    common::create_test_file(dir.path(), "2021/Αθλητισμός/c.txt", "c").unwrap();
    common::create_test_file(dir.path(), "top.txt", "root file").unwrap();

    let grouped = grouper::group(dir.path(), "txt").unwrap();

    let root_name = dir.path().file_name().unwrap().to_string_lossy().into_owned();
    assert_eq!(grouped.len(), 3);
    assert!(grouped.keys().contains(&root_name));
    let history: Vec<PathBuf> = grouped.files("Ιστορία").to_vec();
    assert_eq!(
        history,
        vec![dir.path().join("2020/Ιστορία/b.txt"), dir.path().join("2021/Ιστορία/a.txt")]
    );
    // Greek keys sort after ASCII ones
    assert_eq!(grouped.keys().last().map(String::as_str), Some("Ιστορία"));
}

#[test]
fn test_group_withMissingRoot_shouldFail() {
    let dir = common::create_temp_dir().unwrap();
    assert!(grouper::group(&dir.path().join("missing"), "txt").is_err());
}
