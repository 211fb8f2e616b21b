//! v2 form POST protocol with header authentication

use tracing::debug;

use crate::core::config::ConnectorConfig;
use crate::core::credentials::PROPERTY_API_KEY;
use crate::core::errors::{Result, TranslationError};
use crate::core::language::LanguageMapper;
use crate::core::messages::MessageCatalog;
use crate::core::models::{ProtocolVariant, ResolvedOptions, TagHandling, TranslationOptions};
use crate::core::network::{HttpMethod, HttpRequest, HttpResponse, NetworkError, RequestBody};
use crate::processors::response::{ParsedTranslation, ParserKind, ResponseParser};

use super::{
    check_credential, endpoint, network_error, resolve_base_url, resolve_split, response_error, source_code,
    status_error, target_code, EmptyResultPolicy, ProtocolCall, TargetForm, TranslationProtocol,
};

const TRANSLATE_PATH: &str = "/v2/translate";

#[derive(Debug, Clone)]
pub struct ModernPost {
    /// `None`: chosen per key, see [`resolve_base_url`]
    base_url: Option<String>,
    parser: ResponseParser,
    mapper: LanguageMapper,
    messages: MessageCatalog,
}

impl ModernPost {
    pub fn new(base_url: Option<String>, parser: ParserKind, messages: MessageCatalog) -> Self {
        Self {
            base_url,
            parser: ResponseParser::new(parser),
            mapper: LanguageMapper::new(),
            messages,
        }
    }

    pub fn from_config(config: &ConnectorConfig) -> Self {
        Self::new(
            config.base_url.clone(),
            config.parser.unwrap_or(ParserKind::Fallback),
            config.messages.clone(),
        )
    }
}

impl TranslationProtocol for ModernPost {
    fn variant(&self) -> ProtocolVariant {
        ProtocolVariant::ModernPost
    }

    fn credential_key(&self) -> &'static str {
        PROPERTY_API_KEY
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
        check_credential(&self.messages, credential)?;

        let target = target_code(&self.messages, &self.mapper, call.target, TargetForm::Regional)?;
        let source = source_code(&self.mapper, call.source);

        let mut params = vec![
            ("text".to_string(), call.text.to_string()),
            ("target_lang".to_string(), target),
        ];
        if let Some(source) = source {
            params.push(("source_lang".to_string(), source));
        }
        // provider defaults are split on, formatting off, no tag handling
        if !call.options.split_sentences {
            params.push(("split_sentences".to_string(), "0".to_string()));
        }
        if call.options.preserve_formatting {
            params.push(("preserve_formatting".to_string(), "1".to_string()));
        }
        if call.options.tag_handling == TagHandling::Xml {
            params.push(("tag_handling".to_string(), "xml".to_string()));
        }

        let base = resolve_base_url(credential, self.base_url.as_deref());
        let url = endpoint(&self.messages, base, TRANSLATE_PATH)?;

        debug!("Built modern request to {}", url);

        Ok(HttpRequest {
            method: HttpMethod::Post,
            url,
            headers: vec![("Authorization".to_string(), format!("DeepL-Auth-Key {}", credential))],
            body: Some(RequestBody::Form(params)),
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
