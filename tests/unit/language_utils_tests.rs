/*!
 * Tests for language code utilities
 */

use dirtrans::language_utils::{get_language_name, normalize_to_part2t};

#[test]
fn test_getLanguageName_withCommonCodes_shouldReturnEnglishNames() {
    assert_eq!(get_language_name("en").unwrap(), "English");
    assert_eq!(get_language_name("fr").unwrap(), "French");
    assert_eq!(get_language_name("spa").unwrap(), "Spanish");
}

#[test]
fn test_normalizeToPart2t_shouldAcceptAllCodeForms() {
    assert_eq!(normalize_to_part2t("en").unwrap(), "eng");
    assert_eq!(normalize_to_part2t(" EN ").unwrap(), "eng");
    assert_eq!(normalize_to_part2t("fre").unwrap(), "fra");
    assert_eq!(normalize_to_part2t("fra").unwrap(), "fra");
}

#[test]
fn test_normalizeToPart2t_withInvalidCodes_shouldFail() {
    assert!(normalize_to_part2t("").is_err());
    assert!(normalize_to_part2t("zz").is_err());
    assert!(normalize_to_part2t("english").is_err());
}
