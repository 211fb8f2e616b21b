//! Core data models for translation

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Wire protocol variant used to reach the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProtocolVariant {
    /// v1 GET with query parameters and `auth_key`
    #[serde(alias = "legacy", alias = "v1")]
    LegacyGet,
    /// v2 form POST with `Authorization` header
    #[serde(alias = "modern", alias = "v2")]
    ModernPost,
    /// JSON POST through the vendor client abstraction
    #[serde(alias = "sdk")]
    SdkMediated,
}

impl fmt::Display for ProtocolVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolVariant::LegacyGet => write!(f, "legacy_get"),
            ProtocolVariant::ModernPost => write!(f, "modern_post"),
            ProtocolVariant::SdkMediated => write!(f, "sdk_mediated"),
        }
    }
}

impl FromStr for ProtocolVariant {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "legacy_get" | "legacy" | "v1" => Ok(ProtocolVariant::LegacyGet),
            "modern_post" | "modern" | "v2" => Ok(ProtocolVariant::ModernPost),
            "sdk_mediated" | "sdk" => Ok(ProtocolVariant::SdkMediated),
            other => Err(format!("unknown protocol variant: {}", other)),
        }
    }
}

/// A generic language: base code plus optional region or script subtag.
///
/// Parsed from tags such as `en`, `en-US`, `pt_BR` or `zh-Hans`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Language {
    code: String,
    region: Option<String>,
}

impl Language {
    /// Language without a region
    pub fn new(code: impl Into<String>) -> Self {
        let code: String = code.into();
        Self {
            code: code.trim().to_string(),
            region: None,
        }
    }

    /// Language with a region or script subtag
    pub fn with_region(code: impl Into<String>, region: impl Into<String>) -> Self {
        let code: String = code.into();
        let region: String = region.into();
        let region = region.trim().to_string();
        Self {
            code: code.trim().to_string(),
            region: if region.is_empty() { None } else { Some(region) },
        }
    }

    /// Parse a tag; `-` and `_` are both accepted as separators
    pub fn parse(tag: &str) -> Self {
        let tag = tag.trim();
        match tag.split_once(|c| c == '-' || c == '_') {
            Some((code, region)) => Self::with_region(code, region.replace('_', "-")),
            None => Self::new(tag),
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    /// Tag as supplied, e.g. `de-DE`
    pub fn tag(&self) -> String {
        match &self.region {
            Some(region) => format!("{}-{}", self.code, region),
            None => self.code.clone(),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

impl FromStr for Language {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Language::parse(s))
    }
}

/// Whether inline markup is structural or literal for the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagHandling {
    None,
    Xml,
}

/// Caller overrides; unset fields fall back to the protocol variant's defaults
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationOptions {
    /// `true`: provider segments sentences. `false`: text is already a sentence
    pub split_sentences: Option<bool>,
    pub preserve_formatting: Option<bool>,
    pub tag_handling: Option<TagHandling>,
}

impl TranslationOptions {
    pub fn with_split_sentences(mut self, split: bool) -> Self {
        self.split_sentences = Some(split);
        self
    }

    pub fn with_preserve_formatting(mut self, preserve: bool) -> Self {
        self.preserve_formatting = Some(preserve);
        self
    }

    pub fn with_tag_handling(mut self, tag_handling: TagHandling) -> Self {
        self.tag_handling = Some(tag_handling);
        self
    }
}

/// Options after the variant defaults have been applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedOptions {
    pub split_sentences: bool,
    pub preserve_formatting: bool,
    pub tag_handling: TagHandling,
}

/// Translation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationRequest {
    pub text: String,
    pub source_lang: Option<Language>,
    pub target_lang: Language,
    #[serde(default)]
    pub options: TranslationOptions,
}

impl TranslationRequest {
    pub fn new(text: impl Into<String>, target_lang: Language) -> Self {
        Self {
            text: text.into(),
            source_lang: None,
            target_lang,
            options: TranslationOptions::default(),
        }
    }

    pub fn with_source_lang(mut self, source_lang: Language) -> Self {
        self.source_lang = Some(source_lang);
        self
    }

    pub fn with_options(mut self, options: TranslationOptions) -> Self {
        self.options = options;
        self
    }
}

/// Translation result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationResult {
    pub translation: String,
    pub detected_source_lang: Option<String>,
    /// The text sent was cut to the provider maximum
    pub truncated: bool,
}
