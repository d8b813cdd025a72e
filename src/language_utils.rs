use anyhow::{Result, anyhow};
use isolang::Language;

/// Language utilities for language tag handling
///
/// Target languages are given as short tags such as `zh-CN`, `pt_BR` or `de`.
/// Only the primary subtag is checked against ISO 639; the region is passed
/// through untouched to the translation backend.
/// Language code type
#[derive(Debug, Clone, PartialEq)]
pub enum LanguageCodeType {
    /// ISO 639-1 (2-letter) code
    Part1,
    /// ISO 639-2/T (3-letter) code
    Part2T,
    /// ISO 639-2/B (3-letter) code
    Part2B,
}

/// ISO 639-2/B codes that differ from their ISO 639-2/T counterpart
const BIBLIOGRAPHIC_CODES: &[(&str, &str)] = &[
    ("fre", "fra"),
    ("ger", "deu"),
    ("dut", "nld"),
    ("gre", "ell"),
    ("chi", "zho"),
    ("cze", "ces"),
    ("ice", "isl"),
    ("alb", "sqi"),
    ("arm", "hye"),
    ("baq", "eus"),
    ("bur", "mya"),
    ("per", "fas"),
    ("geo", "kat"),
    ("may", "msa"),
    ("mac", "mkd"),
    ("rum", "ron"),
    ("slo", "slk"),
    ("wel", "cym"),
];

/// Split a language tag into its lowercase primary subtag and optional region
///
/// `"zh-CN"` and `"zh_cn"` both yield `("zh", Some("CN"))`.
pub fn split_language_tag(tag: &str) -> (String, Option<String>) {
    let trimmed = tag.trim();
    let mut parts = trimmed.splitn(2, ['-', '_']);
    let primary = parts.next().unwrap_or_default().to_lowercase();
    let region = parts
        .next()
        .map(|r| r.trim())
        .filter(|r| !r.is_empty())
        .map(|r| r.to_uppercase());
    (primary, region)
}

/// Validate the primary subtag of a language tag
pub fn validate_language_code(code: &str) -> Result<LanguageCodeType> {
    let (primary, _) = split_language_tag(code);

    if primary.len() == 2 {
        if Language::from_639_1(&primary).is_some() {
            return Ok(LanguageCodeType::Part1);
        }
    } else if primary.len() == 3 {
        if Language::from_639_3(&primary).is_some() {
            return Ok(LanguageCodeType::Part2T);
        }
        if BIBLIOGRAPHIC_CODES.iter().any(|(b, _)| *b == primary) {
            return Ok(LanguageCodeType::Part2B);
        }
    }

    Err(anyhow!("Invalid language code: {}", code))
}

/// Normalize the primary subtag of a language tag to ISO 639-2/T (3-letter) format
pub fn normalize_to_part2t(code: &str) -> Result<String> {
    let (primary, _) = split_language_tag(code);

    if primary.len() == 2 {
        if let Some(lang) = Language::from_639_1(&primary) {
            return Ok(lang.to_639_3().to_string());
        }
    } else if primary.len() == 3 {
        if Language::from_639_3(&primary).is_some() {
            return Ok(primary);
        }
        if let Some((_, terminology)) = BIBLIOGRAPHIC_CODES.iter().find(|(b, _)| *b == primary) {
            return Ok((*terminology).to_string());
        }
    }

    Err(anyhow!("Cannot normalize invalid language code: {}", code))
}

/// Check if two language tags name the same language, ignoring regions
pub fn language_codes_match(code1: &str, code2: &str) -> bool {
    match (normalize_to_part2t(code1), normalize_to_part2t(code2)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Get the English language name from a tag, with the region appended when present
pub fn get_language_name(code: &str) -> Result<String> {
    let normalized = normalize_to_part2t(code)?;
    let lang = Language::from_639_3(&normalized)
        .ok_or_else(|| anyhow!("Failed to get language from code: {}", normalized))?;

    let (_, region) = split_language_tag(code);
    Ok(match region {
        Some(region) => format!("{} ({})", lang.to_name(), region),
        None => lang.to_name().to_string(),
    })
}
