//! Provider response parsing
//!
//! Two interchangeable paths extract the first translation from
//! `{"translations":[{"detected_source_language":"DE","text":"..."}]}`:
//! a structured `serde_json` decode and a regex extractor with manual escape
//! decoding. Both must agree on well-formed input.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use thiserror::Error;

use crate::core::errors::BoxError;
use crate::processors::escape::decode_json_string;

/// Which extraction path a protocol uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParserKind {
    Structured,
    Fallback,
}

/// First translation entry of a response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTranslation {
    pub text: String,
    pub detected_source_language: Option<String>,
}

/// Response parsing failures
#[derive(Debug, Error)]
pub enum ResponseError {
    /// Not well-formed enough to extract a translation
    #[error("malformed response: {message}")]
    Malformed {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// Well-formed, but no translation entry
    #[error("response carries no translation")]
    Empty,
}

impl ResponseError {
    fn malformed(message: impl Into<String>, source: Option<BoxError>) -> Self {
        ResponseError::Malformed {
            message: message.into(),
            source,
        }
    }
}

#[derive(Deserialize)]
struct TranslationsResponse {
    translations: Vec<TranslationEntry>,
}

#[derive(Deserialize)]
struct TranslationEntry {
    text: Option<String>,
    detected_source_language: Option<String>,
}

fn text_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#""text"\s*:\s*"((?:\\.|[^\\"])*)""#).expect("text pattern is valid")
    })
}

fn detected_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#""detected_source_language"\s*:\s*"((?:\\.|[^\\"])*)""#)
            .expect("detected language pattern is valid")
    })
}

fn translations_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#""translations"\s*:\s*\["#).expect("translations pattern is valid")
    })
}

/// Extracts the first translation from a raw response body
#[derive(Debug, Clone, Copy)]
pub struct ResponseParser {
    kind: ParserKind,
}

impl ResponseParser {
    pub fn new(kind: ParserKind) -> Self {
        Self { kind }
    }

    pub fn kind(&self) -> ParserKind {
        self.kind
    }

    pub fn parse(&self, raw: &str) -> Result<ParsedTranslation, ResponseError> {
        match self.kind {
            ParserKind::Structured => parse_structured(raw),
            ParserKind::Fallback => parse_fallback(raw),
        }
    }
}

/// `translations[0].text` via serde_json
pub fn parse_structured(raw: &str) -> Result<ParsedTranslation, ResponseError> {
    let response: TranslationsResponse = serde_json::from_str(raw)
        .map_err(|e| ResponseError::malformed(e.to_string(), Some(Box::new(e))))?;

    let first = response.translations.into_iter().next().ok_or(ResponseError::Empty)?;
    let text = first.text.ok_or(ResponseError::Empty)?;

    Ok(ParsedTranslation {
        text,
        detected_source_language: first.detected_source_language,
    })
}

/// First `"text":"..."` field, decoded by hand
pub fn parse_fallback(raw: &str) -> Result<ParsedTranslation, ResponseError> {
    let Some(captures) = text_pattern().captures(raw) else {
        // a translations array without any text string: empty, null or absent
        if translations_pattern().is_match(raw) {
            return Err(ResponseError::Empty);
        }
        return Err(ResponseError::malformed("missing translation text", None));
    };

    let text = decode_json_string(&captures[1])
        .map_err(|e| ResponseError::malformed(e.to_string(), Some(Box::new(e))))?;

    let detected_source_language = detected_pattern()
        .captures(raw)
        .and_then(|c| decode_json_string(&c[1]).ok());

    Ok(ParsedTranslation {
        text,
        detected_source_language,
    })
}
