//! SDK-mediated protocol
//!
//! Calls go through [`DeepLClient`], a small vendor client speaking the JSON
//! flavour of the REST API. Client failures come back as [`DeepLError`] and
//! are classified by walking their cause chain.

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::error::Error as StdError;
use thiserror::Error;
use tracing::{debug, warn};

use crate::core::config::ConnectorConfig;
use crate::core::credentials::PROPERTY_V2_API_KEY;
use crate::core::errors::{Result, TranslationError};
use crate::core::language::LanguageMapper;
use crate::core::messages::MessageCatalog;
use crate::core::models::{ProtocolVariant, ResolvedOptions, TagHandling, TranslationOptions};
use crate::core::network::{HttpMethod, HttpRequest, HttpResponse, NetworkError, RequestBody};
use crate::processors::response::ParsedTranslation;

use super::{
    resolve_base_url, resolve_split, source_code, target_code, EmptyResultPolicy, ProtocolCall, TargetForm,
    TranslationProtocol,
};

/// REST API version the client talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DeepLApiVersion {
    #[serde(rename = "v1")]
    Version1,
    #[default]
    #[serde(rename = "v2")]
    Version2,
}

impl DeepLApiVersion {
    fn translate_path(self) -> &'static str {
        match self {
            DeepLApiVersion::Version1 => "/v1/translate",
            DeepLApiVersion::Version2 => "/v2/translate",
        }
    }
}

/// Client construction options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeepLClientOptions {
    pub api_version: DeepLApiVersion,
    /// `None`: Free or Pro host detected from the key
    pub server_url: Option<String>,
}

impl DeepLClientOptions {
    pub fn set_api_version(mut self, api_version: DeepLApiVersion) -> Self {
        self.api_version = api_version;
        self
    }

    pub fn set_server_url(mut self, server_url: impl Into<String>) -> Self {
        self.server_url = Some(server_url.into());
        self
    }
}

/// How the provider splits input into sentences
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentenceSplittingMode {
    /// On punctuation and newlines (provider default)
    All,
    /// On punctuation only
    NoNewlines,
    Off,
}

impl SentenceSplittingMode {
    pub fn as_param(self) -> &'static str {
        match self {
            SentenceSplittingMode::All => "1",
            SentenceSplittingMode::NoNewlines => "nonewlines",
            SentenceSplittingMode::Off => "0",
        }
    }
}

/// Per-call text options; unset fields are left to the provider
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextTranslationOptions {
    pub sentence_splitting_mode: Option<SentenceSplittingMode>,
    pub preserve_formatting: Option<bool>,
    pub tag_handling: Option<String>,
}

impl TextTranslationOptions {
    pub fn set_sentence_splitting_mode(mut self, mode: SentenceSplittingMode) -> Self {
        self.sentence_splitting_mode = Some(mode);
        self
    }

    pub fn set_preserve_formatting(mut self, preserve: bool) -> Self {
        self.preserve_formatting = Some(preserve);
        self
    }

    pub fn set_tag_handling(mut self, tag_handling: impl Into<String>) -> Self {
        self.tag_handling = Some(tag_handling.into());
        self
    }
}

/// One translated text
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TextResult {
    pub text: String,
    pub detected_source_language: Option<String>,
}

#[derive(Deserialize)]
struct TextResults {
    translations: Vec<TextResult>,
}

/// Client-side failures
#[derive(Debug, Error)]
pub enum DeepLError {
    #[error("request could not be built")]
    Request(#[source] Box<dyn StdError + Send + Sync>),

    #[error("transport failed")]
    Transport(#[source] NetworkError),

    #[error("DeepL answered HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("invalid DeepL response")]
    InvalidResponse(#[source] serde_json::Error),
}

impl DeepLError {
    fn status(&self) -> Option<u16> {
        match self {
            DeepLError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Minimal DeepL client bound to one key
#[derive(Debug, Clone)]
pub struct DeepLClient {
    auth_key: String,
    options: DeepLClientOptions,
}

impl DeepLClient {
    pub fn new(auth_key: impl Into<String>, options: DeepLClientOptions) -> Self {
        Self {
            auth_key: auth_key.into(),
            options,
        }
    }

    pub fn server_url(&self) -> &str {
        resolve_base_url(&self.auth_key, self.options.server_url.as_deref())
    }

    /// Request translating `text` into `target_lang`
    pub fn translate_text_request(
        &self,
        text: &str,
        source_lang: Option<&str>,
        target_lang: &str,
        options: &TextTranslationOptions,
    ) -> std::result::Result<HttpRequest, DeepLError> {
        if self.auth_key.chars().any(char::is_control) {
            return Err(DeepLError::Request(Box::new(NetworkError::Encoding {
                message: "auth key contains control characters".to_string(),
                source: None,
            })));
        }

        let address = format!(
            "{}{}",
            self.server_url().trim_end_matches('/'),
            self.options.api_version.translate_path()
        );
        let url = url::Url::parse(&address).map_err(|e| DeepLError::Request(Box::new(e)))?;

        let mut body = json!({
            "text": [text],
            "target_lang": target_lang,
        });
        if let Some(source_lang) = source_lang {
            body["source_lang"] = json!(source_lang);
        }
        if let Some(mode) = options.sentence_splitting_mode.filter(|m| *m != SentenceSplittingMode::All) {
            body["split_sentences"] = json!(mode.as_param());
        }
        if let Some(preserve) = options.preserve_formatting {
            body["preserve_formatting"] = json!(preserve);
        }
        if let Some(tag_handling) = &options.tag_handling {
            body["tag_handling"] = json!(tag_handling);
        }

        Ok(HttpRequest {
            method: HttpMethod::Post,
            url,
            headers: vec![
                ("Authorization".to_string(), format!("DeepL-Auth-Key {}", self.auth_key)),
                (
                    "User-Agent".to_string(),
                    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
                ),
            ],
            body: Some(RequestBody::Json(body)),
        })
    }

    /// Results of a translate call, in request order
    pub fn read_text_results(response: &HttpResponse) -> std::result::Result<Vec<TextResult>, DeepLError> {
        if !response.is_success() {
            let message = serde_json::from_str::<serde_json::Value>(&response.body)
                .ok()
                .and_then(|v| v["message"].as_str().map(str::to_string))
                .unwrap_or_else(|| response.body.chars().take(200).collect());
            return Err(DeepLError::Api {
                status: response.status,
                message,
            });
        }

        let results: TextResults = serde_json::from_str(&response.body).map_err(DeepLError::InvalidResponse)?;
        Ok(results.translations)
    }
}

/// Failure class found in a client error's cause chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FailureClass {
    Encoding,
    Connection,
    General,
}

fn classify(err: &DeepLError) -> FailureClass {
    let mut cause: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(current) = cause {
        if let Some(network) = current.downcast_ref::<NetworkError>() {
            return match network {
                NetworkError::Encoding { .. } => FailureClass::Encoding,
                NetworkError::Connection { .. } => FailureClass::Connection,
            };
        }
        if current.downcast_ref::<url::ParseError>().is_some() {
            return FailureClass::Encoding;
        }
        cause = current.source();
    }
    FailureClass::General
}

/// Protocol backed by [`DeepLClient`]
#[derive(Debug, Clone)]
pub struct SdkMediated {
    client_options: DeepLClientOptions,
    mapper: LanguageMapper,
    messages: MessageCatalog,
}

impl SdkMediated {
    pub fn new(client_options: DeepLClientOptions, messages: MessageCatalog) -> Self {
        Self {
            client_options,
            mapper: LanguageMapper::new(),
            messages,
        }
    }

    pub fn from_config(config: &ConnectorConfig) -> Self {
        let mut options = DeepLClientOptions::default().set_api_version(config.api_version);
        if let Some(url) = &config.base_url {
            options = options.set_server_url(url.clone());
        }
        Self::new(options, config.messages.clone())
    }

    fn client(&self, credential: &str) -> DeepLClient {
        DeepLClient::new(credential, self.client_options.clone())
    }

    fn text_options(options: &ResolvedOptions) -> TextTranslationOptions {
        let mut text_options = TextTranslationOptions::default();
        if !options.split_sentences {
            text_options = text_options.set_sentence_splitting_mode(SentenceSplittingMode::Off);
        }
        if options.preserve_formatting {
            text_options = text_options.set_preserve_formatting(true);
        }
        if options.tag_handling == TagHandling::Xml {
            text_options = text_options.set_tag_handling("xml");
        }
        text_options
    }

    fn client_error(&self, call: &ProtocolCall<'_>, err: DeepLError) -> TranslationError {
        match classify(&err) {
            FailureClass::Encoding => TranslationError::encoding(self.messages.encoding_error.clone(), err),
            FailureClass::Connection => TranslationError::connection(self.messages.connection_error.clone(), err),
            FailureClass::General => {
                let source = source_code(&self.mapper, call.source).unwrap_or_else(|| "auto".to_string());
                let target = self.mapper.to_provider_target(call.target);
                warn!("DeepL client failed: {}", err);
                TranslationError::ProviderError {
                    status: err.status(),
                    message: self.messages.general_error_for(&source, &target),
                    source: Some(Box::new(err)),
                }
            }
        }
    }
}

impl TranslationProtocol for SdkMediated {
    fn variant(&self) -> ProtocolVariant {
        ProtocolVariant::SdkMediated
    }

    fn credential_key(&self) -> &'static str {
        PROPERTY_V2_API_KEY
    }

    fn empty_result_policy(&self) -> EmptyResultPolicy {
        EmptyResultPolicy::Hard
    }

    fn resolve_options(&self, overrides: &TranslationOptions, segmenting: Option<bool>) -> ResolvedOptions {
        ResolvedOptions {
            split_sentences: resolve_split(overrides, segmenting),
            preserve_formatting: overrides.preserve_formatting.unwrap_or(false),
            tag_handling: overrides.tag_handling.unwrap_or(TagHandling::None),
        }
    }

    fn build_request(&self, call: &ProtocolCall<'_>, credential: &str) -> Result<HttpRequest> {
        let target = target_code(&self.messages, &self.mapper, call.target, TargetForm::Regional)?;
        let source = source_code(&self.mapper, call.source);
        let client = self.client(credential);

        debug!("Built SDK request to {}", client.server_url());

        client
            .translate_text_request(call.text, source.as_deref(), &target, &Self::text_options(&call.options))
            .map_err(|e| self.client_error(call, e))
    }

    fn read_response(&self, call: &ProtocolCall<'_>, response: &HttpResponse) -> Result<ParsedTranslation> {
        let results = DeepLClient::read_text_results(response).map_err(|e| self.client_error(call, e))?;

        let first = results.into_iter().next().ok_or_else(|| TranslationError::EmptyResultError {
            message: self.messages.json_empty_error.clone(),
        })?;

        Ok(ParsedTranslation {
            text: first.text,
            detected_source_language: first.detected_source_language,
        })
    }

    fn transport_error(&self, call: &ProtocolCall<'_>, err: NetworkError) -> TranslationError {
        self.client_error(call, DeepLError::Transport(err))
    }
}
