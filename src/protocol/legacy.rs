//! v1 key/value GET protocol
//!
//! Everything, the key included, travels in the query string. The v1 endpoint
//! knows no regional targets, so both languages are narrowed to base codes.

use tracing::debug;

use crate::core::config::ConnectorConfig;
use crate::core::credentials::PROPERTY_API_KEY;
use crate::core::errors::{Result, TranslationError};
use crate::core::language::LanguageMapper;
use crate::core::messages::MessageCatalog;
use crate::core::models::{ProtocolVariant, ResolvedOptions, TagHandling, TranslationOptions};
use crate::core::network::{HttpMethod, HttpRequest, HttpResponse, NetworkError};
use crate::processors::response::{ParsedTranslation, ParserKind, ResponseParser};

use super::{
    check_credential, endpoint, network_error, resolve_split, response_error, source_code, status_error,
    target_code, EmptyResultPolicy, ProtocolCall, TargetForm, TranslationProtocol, DEEPL_URL,
};

const TRANSLATE_PATH: &str = "/v1/translate";

#[derive(Debug, Clone)]
pub struct LegacyGet {
    base_url: String,
    parser: ResponseParser,
    mapper: LanguageMapper,
    messages: MessageCatalog,
}

impl LegacyGet {
    pub fn new(base_url: impl Into<String>, parser: ParserKind, messages: MessageCatalog) -> Self {
        Self {
            base_url: base_url.into(),
            parser: ResponseParser::new(parser),
            mapper: LanguageMapper::new(),
            messages,
        }
    }

    pub fn from_config(config: &ConnectorConfig) -> Self {
        Self::new(
            config.base_url.as_deref().unwrap_or(DEEPL_URL),
            config.parser.unwrap_or(ParserKind::Structured),
            config.messages.clone(),
        )
    }
}

fn flag(value: bool) -> &'static str {
    if value {
        "1"
    } else {
        "0"
    }
}

impl TranslationProtocol for LegacyGet {
    fn variant(&self) -> ProtocolVariant {
        ProtocolVariant::LegacyGet
    }

    fn credential_key(&self) -> &'static str {
        PROPERTY_API_KEY
    }

    fn empty_result_policy(&self) -> EmptyResultPolicy {
        EmptyResultPolicy::Soft
    }

    fn resolve_options(&self, overrides: &TranslationOptions, segmenting: Option<bool>) -> ResolvedOptions {
        ResolvedOptions {
            split_sentences: resolve_split(overrides, segmenting),
            preserve_formatting: overrides.preserve_formatting.unwrap_or(true),
            tag_handling: overrides.tag_handling.unwrap_or(TagHandling::Xml),
        }
    }

    fn build_request(&self, call: &ProtocolCall<'_>, credential: &str) -> Result<HttpRequest> {
        check_credential(&self.messages, credential)?;

        let target = target_code(&self.messages, &self.mapper, call.target, TargetForm::Base)?;

        // sorted by name
        let mut params: Vec<(&str, &str)> = vec![("auth_key", credential)];
        params.push(("preserve_formatting", flag(call.options.preserve_formatting)));
        let source = source_code(&self.mapper, call.source);
        if let Some(source) = source.as_deref() {
            params.push(("source_lang", source));
        }
        params.push(("split_sentences", flag(call.options.split_sentences)));
        if call.options.tag_handling == TagHandling::Xml {
            params.push(("tag_handling", "xml"));
        }
        params.push(("target_lang", target.as_str()));
        params.push(("text", call.text));

        let mut url = endpoint(&self.messages, &self.base_url, TRANSLATE_PATH)?;
        url.query_pairs_mut().extend_pairs(params);

        debug!("Built legacy request {} -> {}", source.as_deref().unwrap_or("auto"), target);

        Ok(HttpRequest {
            method: HttpMethod::Get,
            url,
            headers: Vec::new(),
            body: None,
        })
    }

    fn read_response(&self, _call: &ProtocolCall<'_>, response: &HttpResponse) -> Result<ParsedTranslation> {
        if !response.is_success() {
            return Err(status_error(response));
        }
        self.parser
            .parse(&response.body)
            .map_err(|e| response_error(&self.messages, e))
    }

    fn transport_error(&self, _call: &ProtocolCall<'_>, err: NetworkError) -> TranslationError {
        network_error(&self.messages, err)
    }
}
