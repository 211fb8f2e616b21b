//! Mapping between generic language tags and DeepL language codes
//!
//! Targets may carry a regional variant (`EN-US`, `PT-BR`, `ZH-HANS`); sources
//! are always narrowed to the base code because the provider does not
//! distinguish source regions.

use crate::core::models::Language;

/// Regional widening for the `target_lang` parameter
const TARGET_LANG_MAP: &[(&str, &str)] = &[
    ("EN-US", "EN-US"),
    ("EN-GB", "EN-GB"),
    ("EN", "EN-US"),
    ("PT-BR", "PT-BR"),
    ("PT-PT", "PT-PT"),
    ("PT", "PT-BR"),
    // Chinese targets are script-based on the provider side
    ("ZH-CN", "ZH-HANS"),
    ("ZH-TW", "ZH-HANT"),
    ("ZH-HANS", "ZH-HANS"),
    ("ZH-HANT", "ZH-HANT"),
];

/// Regional narrowing for the `source_lang` parameter
const SOURCE_LANG_MAP: &[(&str, &str)] = &[
    ("EN-US", "EN"),
    ("EN-GB", "EN"),
    ("PT-BR", "PT"),
    ("PT-PT", "PT"),
    ("ZH-CN", "ZH"),
    ("ZH-TW", "ZH"),
    ("ZH-HANS", "ZH"),
    ("ZH-HANT", "ZH"),
];

/// Converts generic languages into provider codes
#[derive(Debug, Clone, Copy, Default)]
pub struct LanguageMapper;

impl LanguageMapper {
    pub fn new() -> Self {
        Self
    }

    /// Code for `target_lang`. Empty when the language has no code.
    pub fn to_provider_target(&self, language: &Language) -> String {
        Self::map(language, TARGET_LANG_MAP)
    }

    /// Code for `source_lang`. Empty when the language has no code.
    pub fn to_provider_source(&self, language: &Language) -> String {
        Self::map(language, SOURCE_LANG_MAP)
    }

    /// Exact regional rule, then bare-code rule, then the bare code itself
    fn map(language: &Language, table: &[(&str, &str)]) -> String {
        let base = language.code().to_uppercase();
        let full = match language.region() {
            Some(region) => format!("{}-{}", base, region.to_uppercase()),
            None => base.clone(),
        };

        lookup(table, &full)
            .or_else(|| lookup(table, &base))
            .map(str::to_string)
            .unwrap_or(base)
    }
}

fn lookup<'a>(table: &[(&str, &'a str)], key: &str) -> Option<&'a str> {
    table
        .iter()
        .find(|(from, _)| *from == key)
        .map(|(_, to)| *to)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(tag: &str) -> String {
        LanguageMapper::new().to_provider_target(&Language::parse(tag))
    }

    fn source(tag: &str) -> String {
        LanguageMapper::new().to_provider_source(&Language::parse(tag))
    }

    #[test]
    fn test_target_regional_defaults() {
        assert_eq!(target("en"), "EN-US");
        assert_eq!(target("pt"), "PT-BR");
        assert_eq!(target("en-GB"), "EN-GB");
        assert_eq!(target("pt-PT"), "PT-PT");
    }

    #[test]
    fn test_target_chinese_scripts() {
        assert_eq!(target("zh-CN"), "ZH-HANS");
        assert_eq!(target("zh_TW"), "ZH-HANT");
        assert_eq!(target("zh-Hant"), "ZH-HANT");
    }

    #[test]
    fn test_bare_chinese_target_falls_back_verbatim() {
        assert_eq!(target("zh"), "ZH");
    }

    #[test]
    fn test_target_without_rule_uses_bare_code() {
        assert_eq!(target("de-DE"), "DE");
        assert_eq!(target("fr"), "FR");
        // bare-code rule applies to unknown regions
        assert_eq!(target("en-AU"), "EN-US");
    }

    #[test]
    fn test_source_narrows_regions() {
        assert_eq!(source("en-GB"), "EN");
        assert_eq!(source("en-us"), "EN");
        assert_eq!(source("pt-BR"), "PT");
        assert_eq!(source("zh-Hans"), "ZH");
        assert_eq!(source("zh-TW"), "ZH");
        assert_eq!(source("de-AT"), "DE");
    }

    #[test]
    fn test_source_mapping_is_idempotent() {
        for tag in ["en-US", "en-GB", "pt-PT", "zh-CN", "zh-Hant", "ja", "de-CH", "xx-YY"] {
            let once = source(tag);
            let twice = source(&once);
            assert_eq!(once, twice, "source mapping oscillates for {}", tag);
        }
    }

    #[test]
    fn test_empty_code_maps_to_empty() {
        assert_eq!(target(""), "");
        assert_eq!(source(""), "");
    }
}
