//! Provider wire protocols
//!
//! Each variant turns a [`ProtocolCall`] into an [`HttpRequest`] and reads the
//! provider's answer back. The connector drives them through
//! [`TranslationProtocol`] and never looks at the wire format itself.

pub mod legacy;
pub mod modern;
pub mod sdk;

use std::fmt;
use url::Url;

use crate::core::config::ConnectorConfig;
use crate::core::errors::{Result, TranslationError};
use crate::core::language::LanguageMapper;
use crate::core::messages::MessageCatalog;
use crate::core::models::{Language, ProtocolVariant, ResolvedOptions, TranslationOptions};
use crate::core::network::{HttpRequest, HttpResponse, NetworkError};
use crate::processors::response::{ParsedTranslation, ResponseError};

pub use legacy::LegacyGet;
pub use modern::ModernPost;
pub use sdk::SdkMediated;

/// Pro endpoint
pub const DEEPL_URL: &str = "https://api.deepl.com";

/// Free-tier endpoint, selected for keys ending in `:fx`
pub const DEEPL_URL_FREE: &str = "https://api-free.deepl.com";

/// Response bodies quoted in provider errors are cut to this many characters
const BODY_EXCERPT_LEN: usize = 200;

/// What an empty `translations` array means for a variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyResultPolicy {
    /// "No translation", returned as `Ok(None)` and not cached
    Soft,
    /// `EmptyResultError`
    Hard,
}

/// One provider call, with the text already truncated
#[derive(Debug, Clone, Copy)]
pub struct ProtocolCall<'a> {
    pub source: Option<&'a Language>,
    pub target: &'a Language,
    pub text: &'a str,
    pub options: ResolvedOptions,
}

/// A provider transport variant
pub trait TranslationProtocol: Send + Sync + fmt::Debug {
    fn variant(&self) -> ProtocolVariant;

    /// Credential store key holding this variant's API key
    fn credential_key(&self) -> &'static str;

    fn empty_result_policy(&self) -> EmptyResultPolicy;

    /// Apply this variant's defaults to the caller's overrides.
    ///
    /// `segmenting` is the host project's sentence segmentation flag.
    fn resolve_options(&self, overrides: &TranslationOptions, segmenting: Option<bool>) -> ResolvedOptions;

    /// Pure: the same call and credential always produce the same request
    fn build_request(&self, call: &ProtocolCall<'_>, credential: &str) -> Result<HttpRequest>;

    /// Interpret a response, whatever its status
    fn read_response(&self, call: &ProtocolCall<'_>, response: &HttpResponse) -> Result<ParsedTranslation>;

    /// Map a transport failure
    fn transport_error(&self, call: &ProtocolCall<'_>, err: NetworkError) -> TranslationError;
}

/// Protocol for the configured variant
pub fn for_config(config: &ConnectorConfig) -> Box<dyn TranslationProtocol> {
    match config.protocol {
        ProtocolVariant::LegacyGet => Box::new(LegacyGet::from_config(config)),
        ProtocolVariant::ModernPost => Box::new(ModernPost::from_config(config)),
        ProtocolVariant::SdkMediated => Box::new(SdkMediated::from_config(config)),
    }
}

/// `split_sentences` after the override and the project setting.
///
/// Texts the host already segmented are sent with splitting off.
pub(crate) fn resolve_split(overrides: &TranslationOptions, segmenting: Option<bool>) -> bool {
    overrides.split_sentences.unwrap_or(segmenting != Some(true))
}

/// Host for a key: free tier for `:fx` keys unless overridden
pub fn resolve_base_url<'a>(credential: &str, override_url: Option<&'a str>) -> &'a str {
    match override_url {
        Some(url) => url,
        None if credential.ends_with(":fx") => DEEPL_URL_FREE,
        None => DEEPL_URL,
    }
}

/// `{base}{path}` as a URL
pub(crate) fn endpoint(messages: &MessageCatalog, base: &str, path: &str) -> Result<Url> {
    let joined = format!("{}{}", base.trim_end_matches('/'), path);
    Url::parse(&joined).map_err(|e| TranslationError::encoding(messages.encoding_error.clone(), e))
}

/// Keys travel in a header or query string; control characters cannot
pub(crate) fn check_credential(messages: &MessageCatalog, credential: &str) -> Result<()> {
    match credential.chars().find(|c| c.is_control()) {
        Some(c) => Err(TranslationError::EncodingError {
            message: messages.encoding_error.clone(),
            source: Some(format!("credential contains control character U+{:04X}", c as u32).into()),
        }),
        None => Ok(()),
    }
}

/// Shape of the target code a protocol sends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TargetForm {
    /// `EN-US`, `PT-BR`, `ZH-HANS`
    Regional,
    /// Base code only, for endpoints without regional targets
    Base,
}

/// Provider target code, failing when the language has no code at all
pub(crate) fn target_code(
    messages: &MessageCatalog,
    mapper: &LanguageMapper,
    target: &Language,
    form: TargetForm,
) -> Result<String> {
    let code = match form {
        TargetForm::Regional => mapper.to_provider_target(target),
        TargetForm::Base => mapper.to_provider_source(target),
    };
    if code.is_empty() {
        return Err(TranslationError::config(messages.unmapped_target.clone()));
    }
    Ok(code)
}

/// Source code, `None` when auto-detecting or the language has no code
pub(crate) fn source_code(mapper: &LanguageMapper, source: Option<&Language>) -> Option<String> {
    source
        .map(|lang| mapper.to_provider_source(lang))
        .filter(|code| !code.is_empty())
}

pub(crate) fn response_error(messages: &MessageCatalog, err: ResponseError) -> TranslationError {
    match err {
        ResponseError::Malformed { .. } => TranslationError::parse(messages.json_parse_error.clone(), Some(Box::new(err))),
        ResponseError::Empty => TranslationError::EmptyResultError {
            message: messages.json_empty_error.clone(),
        },
    }
}

pub(crate) fn network_error(messages: &MessageCatalog, err: NetworkError) -> TranslationError {
    match err {
        NetworkError::Connection { .. } => TranslationError::connection(messages.connection_error.clone(), err),
        NetworkError::Encoding { .. } => TranslationError::encoding(messages.encoding_error.clone(), err),
    }
}

/// Non-2xx answer, quoting the start of the body
pub(crate) fn status_error(response: &HttpResponse) -> TranslationError {
    let excerpt: String = response.body.chars().take(BODY_EXCERPT_LEN).collect();
    TranslationError::ProviderError {
        status: Some(response.status),
        message: format!("HTTP {}: {}", response.status, excerpt.trim()),
        source: None,
    }
}
