/*!
 * Tests for language utility functions
 */

use docxlate::language_utils::{
    get_language_name, language_codes_match, normalize_to_part2t, split_language_tag, validate_language_code,
    LanguageCodeType,
};

/// Test validation of language codes
#[test]
fn test_validate_language_code_withValidCodes_shouldReturnCorrectType() {
    // ISO 639-1 tests
    assert!(matches!(validate_language_code("en").unwrap(), LanguageCodeType::Part1));
    assert!(matches!(validate_language_code("zh").unwrap(), LanguageCodeType::Part1));

    // ISO 639-2/T tests
    assert!(matches!(validate_language_code("eng").unwrap(), LanguageCodeType::Part2T));
    assert!(matches!(validate_language_code("deu").unwrap(), LanguageCodeType::Part2T));

    // ISO 639-2/B tests
    assert!(matches!(validate_language_code("fre").unwrap(), LanguageCodeType::Part2B));
    assert!(matches!(validate_language_code("chi").unwrap(), LanguageCodeType::Part2B));

    // Region subtags and case
    assert!(matches!(validate_language_code("zh-CN").unwrap(), LanguageCodeType::Part1));
    assert!(matches!(validate_language_code(" PT_br ").unwrap(), LanguageCodeType::Part1));

    // Invalid codes
    assert!(validate_language_code("zz").is_err());
    assert!(validate_language_code("123").is_err());
    assert!(validate_language_code("e").is_err());
    assert!(validate_language_code("").is_err());
}

#[test]
fn test_splitLanguageTag_withRegion_shouldNormalizeCase() {
    assert_eq!(split_language_tag("zh-CN"), ("zh".to_string(), Some("CN".to_string())));
    assert_eq!(split_language_tag("pt_br"), ("pt".to_string(), Some("BR".to_string())));
    assert_eq!(split_language_tag("DE"), ("de".to_string(), None));
    assert_eq!(split_language_tag("fr-"), ("fr".to_string(), None));
}

/// Test normalization of language codes to ISO 639-2/T format
#[test]
fn test_normalize_to_part2t_withValidCodes_shouldNormalizeCorrectly() {
    assert_eq!(normalize_to_part2t("en").unwrap(), "eng");
    assert_eq!(normalize_to_part2t("zh-CN").unwrap(), "zho");
    assert_eq!(normalize_to_part2t("ger").unwrap(), "deu");
    assert_eq!(normalize_to_part2t("fra").unwrap(), "fra");
    assert!(normalize_to_part2t("zz").is_err());
}

#[test]
fn test_languageCodesMatch_withEquivalentTags_shouldMatch() {
    assert!(language_codes_match("zh-CN", "zho"));
    assert!(language_codes_match("fr", "fre"));
    assert!(language_codes_match("de-AT", "de-DE"));
    assert!(!language_codes_match("en", "fr"));
    assert!(!language_codes_match("zz", "zz"));
}

#[test]
fn test_getLanguageName_withRegion_shouldAppendRegion() {
    assert_eq!(get_language_name("zh-CN").unwrap(), "Chinese (CN)");
    assert_eq!(get_language_name("fr").unwrap(), "French");
    assert!(get_language_name("zz").is_err());
}
