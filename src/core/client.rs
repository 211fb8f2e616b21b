//! DeepL connector: cache, credential, request, network, parse, normalize

use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::core::cache::{CacheKey, CacheStats, TranslationCache};
use crate::core::config::ConnectorConfig;
use crate::core::credentials::{CredentialStore, EnvCredentialStore, FixedProjectSettings, ProjectSettings};
use crate::core::errors::{Result, TranslationError};
use crate::core::models::{Language, ProtocolVariant, TranslationOptions, TranslationRequest, TranslationResult};
use crate::core::network::{NetworkClient, ReqwestNetwork};
use crate::processors::normalizer::{truncate, TextNormalizer};
use crate::protocol::{self, EmptyResultPolicy, ProtocolCall, TranslationProtocol};

/// Steps of a single translate call, recorded in log events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    ResolvingCredential,
    BuildingRequest,
    AwaitingNetwork,
    ParsingResponse,
    Normalizing,
    Done,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::ResolvingCredential => "resolving_credential",
            Phase::BuildingRequest => "building_request",
            Phase::AwaitingNetwork => "awaiting_network",
            Phase::ParsingResponse => "parsing_response",
            Phase::Normalizing => "normalizing",
            Phase::Done => "done",
        };
        f.write_str(name)
    }
}

/// Machine translation connector for DeepL
#[derive(Clone)]
pub struct DeeplConnector {
    config: Arc<ConnectorConfig>,
    protocol: Arc<dyn TranslationProtocol>,
    network: Arc<dyn NetworkClient>,
    credentials: Arc<dyn CredentialStore>,
    settings: Arc<dyn ProjectSettings>,
    cache: TranslationCache,
    normalizer: TextNormalizer,
    temporary_key: Option<String>,
}

impl fmt::Debug for DeeplConnector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeeplConnector")
            .field("protocol", &self.protocol.variant())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl DeeplConnector {
    /// Create a connector with explicit collaborators
    pub fn new(
        config: ConnectorConfig,
        network: Arc<dyn NetworkClient>,
        credentials: Arc<dyn CredentialStore>,
        settings: Arc<dyn ProjectSettings>,
    ) -> Result<Self> {
        config.validate()?;

        let protocol: Arc<dyn TranslationProtocol> = Arc::from(protocol::for_config(&config));
        info!("DeepL connector ready ({})", protocol.variant());

        Ok(Self {
            config: Arc::new(config),
            protocol,
            network,
            credentials,
            settings,
            cache: TranslationCache::new(),
            normalizer: TextNormalizer::new(),
            temporary_key: None,
        })
    }

    /// reqwest network, environment credentials, no project settings
    pub fn from_config(config: ConnectorConfig) -> Result<Self> {
        let network = ReqwestNetwork::new(config.timeout())
            .map_err(|e| TranslationError::config(format!("HTTP client could not be built: {}", e)))?;

        Self::new(
            config,
            Arc::new(network),
            Arc::new(EnvCredentialStore),
            Arc::new(FixedProjectSettings::default()),
        )
    }

    /// Create from environment
    pub fn from_env() -> Result<Self> {
        let config = ConnectorConfig::from_env()?;
        Self::from_config(config)
    }

    /// Key used when the credential store has none. Never persisted.
    pub fn with_temporary_key(mut self, key: impl Into<String>) -> Self {
        let key: String = key.into();
        self.temporary_key = if key.is_empty() { None } else { Some(key) };
        self
    }

    /// Engine display name
    pub fn name(&self) -> &str {
        &self.config.messages.engine_name
    }

    pub fn variant(&self) -> ProtocolVariant {
        self.protocol.variant()
    }

    pub fn config(&self) -> &ConnectorConfig {
        &self.config
    }

    /// Whether the stored key is kept for this session only
    pub fn credential_is_temporary(&self) -> bool {
        self.credentials.is_temporary(self.protocol.credential_key())
    }

    /// Translate `text`; `Ok(None)` when the provider returned no translation
    /// and the protocol treats that as a soft outcome.
    pub async fn translate(
        &self,
        source: Option<&Language>,
        target: &Language,
        text: &str,
        options: &TranslationOptions,
    ) -> Result<Option<TranslationResult>> {
        if !self.config.enabled {
            warn!("{} is disabled ({})", self.name(), self.config.preference_name());
            return Err(TranslationError::config(self.config.messages.provider_disabled.clone()));
        }

        let key = CacheKey::new(source, target, text);
        if self.config.cache_enabled {
            if let Some(cached) = self.cache.get(&key).await {
                debug!(phase = %Phase::Done, "Served from cache");
                return Ok(Some(cached));
            }
        }

        let outcome = self.execute(source, target, text, options).await;

        match &outcome {
            Ok(Some(result)) if self.config.cache_enabled => {
                self.cache.put(key, result.clone()).await;
            }
            Ok(None) => info!("{} returned no translation", self.name()),
            Err(e) => warn!(code = e.code(), "Translation {} -> {} failed: {}", key.source, key.target, e),
            _ => {}
        }

        outcome
    }

    /// Translate a request value
    pub async fn translate_request(&self, request: &TranslationRequest) -> Result<Option<TranslationResult>> {
        self.translate(
            request.source_lang.as_ref(),
            &request.target_lang,
            &request.text,
            &request.options,
        )
        .await
    }

    /// [`translate`](Self::translate), abandoned with `CancelledError` once
    /// `token` fires. A cancelled call is not cached.
    pub async fn translate_cancellable(
        &self,
        source: Option<&Language>,
        target: &Language,
        text: &str,
        options: &TranslationOptions,
        token: &CancellationToken,
    ) -> Result<Option<TranslationResult>> {
        tokio::select! {
            biased;
            _ = token.cancelled() => {
                info!("{}", self.config.messages.interruption_error);
                Err(TranslationError::CancelledError)
            }
            outcome = self.translate(source, target, text, options) => outcome,
        }
    }

    /// Translate requests one after another
    pub async fn translate_batch(&self, requests: Vec<TranslationRequest>) -> Vec<Result<Option<TranslationResult>>> {
        let mut results = Vec::with_capacity(requests.len());

        for request in &requests {
            results.push(self.translate_request(request).await);
        }

        results
    }

    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.stats().await
    }

    pub async fn clear_cache(&self) {
        self.cache.clear().await;
        info!("Translation cache cleared");
    }

    fn resolve_credential(&self) -> Result<String> {
        let stored = self
            .credentials
            .get_credential(self.protocol.credential_key())
            .filter(|key| !key.is_empty());

        stored
            .or_else(|| self.temporary_key.clone())
            .ok_or_else(|| TranslationError::CredentialMissingError {
                message: self.config.messages.api_key_not_found.clone(),
            })
    }

    /// One uncached round trip
    async fn execute(
        &self,
        source: Option<&Language>,
        target: &Language,
        text: &str,
        options: &TranslationOptions,
    ) -> Result<Option<TranslationResult>> {
        debug!(phase = %Phase::ResolvingCredential);
        let credential = self.resolve_credential()?;

        debug!(phase = %Phase::BuildingRequest);
        let sent = truncate(text, self.config.max_text_length, &self.config.filler);
        let call = ProtocolCall {
            source,
            target,
            text: &sent.text,
            options: self
                .protocol
                .resolve_options(options, self.settings.is_sentence_segmenting_enabled()),
        };
        let request = self.protocol.build_request(&call, &credential)?;

        debug!(phase = %Phase::AwaitingNetwork, "{} characters to {}", call.text.chars().count(), target);
        let response = self
            .network
            .send(request)
            .await
            .map_err(|e| self.protocol.transport_error(&call, e))?;

        debug!(phase = %Phase::ParsingResponse, status = response.status);
        let parsed = match self.protocol.read_response(&call, &response) {
            Ok(parsed) => parsed,
            Err(TranslationError::EmptyResultError { .. })
                if self.protocol.empty_result_policy() == EmptyResultPolicy::Soft =>
            {
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        debug!(phase = %Phase::Normalizing);
        let translation = self.normalizer.normalize(&parsed.text, call.text);

        debug!(phase = %Phase::Done);
        Ok(Some(TranslationResult {
            translation,
            detected_source_lang: parsed.detected_source_language,
            truncated: sent.truncated,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::credentials::{StaticCredentialStore, PROPERTY_API_KEY, PROPERTY_V2_API_KEY};
    use crate::core::network::testing::{spawn_stub, RecordingNetwork};
    use crate::core::network::RequestBody;
    use crate::processors::response::ParserKind;
    use axum::routing::post;
    use axum::{Form, Json, Router};
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::time::Duration;
    use tokio::task::JoinSet;

    const HELLO: &str = r#"{"translations":[{"detected_source_language":"DE","text":"Hello World!"}]}"#;

    fn config(protocol: ProtocolVariant) -> ConnectorConfig {
        ConnectorConfig {
            protocol,
            ..Default::default()
        }
    }

    fn keyed() -> Arc<StaticCredentialStore> {
        Arc::new(
            StaticCredentialStore::new()
                .with_credential(PROPERTY_API_KEY, "secret", false)
                .with_credential(PROPERTY_V2_API_KEY, "secret-v2", true),
        )
    }

    fn connector(config: ConnectorConfig, network: Arc<RecordingNetwork>) -> DeeplConnector {
        DeeplConnector::new(config, network, keyed(), Arc::new(FixedProjectSettings::default())).unwrap()
    }

    fn de() -> Language {
        Language::parse("de-DE")
    }

    fn en() -> Language {
        Language::parse("en-US")
    }

    #[tokio::test]
    async fn test_simple_translation() {
        let network = Arc::new(RecordingNetwork::responding(200, HELLO));
        let connector = connector(config(ProtocolVariant::ModernPost), network.clone());

        let result = connector
            .translate(Some(&de()), &en(), "Hallo Welt!", &TranslationOptions::default())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(result.translation, "Hello World!");
        assert_eq!(result.detected_source_lang.as_deref(), Some("DE"));
        assert!(!result.truncated);

        let request = network.last_request().unwrap();
        assert_eq!(request.form_param("text"), Some("Hallo Welt!"));
        assert_eq!(request.form_param("source_lang"), Some("DE"));
        assert_eq!(request.form_param("target_lang"), Some("EN-US"));
        assert_eq!(request.header("Authorization"), Some("DeepL-Auth-Key secret"));
    }

    #[tokio::test]
    async fn test_missing_credential_never_reaches_network() {
        let network = Arc::new(RecordingNetwork::responding(200, HELLO));
        let connector = DeeplConnector::new(
            config(ProtocolVariant::ModernPost),
            network.clone(),
            Arc::new(StaticCredentialStore::new()),
            Arc::new(FixedProjectSettings::default()),
        )
        .unwrap();

        let err = connector
            .translate(Some(&de()), &en(), "Hallo", &TranslationOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, TranslationError::CredentialMissingError { .. }));
        assert_eq!(err.to_string(), connector.config().messages.api_key_not_found);
        assert_eq!(network.calls(), 0);
    }

    #[tokio::test]
    async fn test_temporary_key_used_when_store_is_empty() {
        let network = Arc::new(RecordingNetwork::responding(200, HELLO));
        let connector = DeeplConnector::new(
            config(ProtocolVariant::LegacyGet),
            network.clone(),
            Arc::new(StaticCredentialStore::new()),
            Arc::new(FixedProjectSettings::default()),
        )
        .unwrap()
        .with_temporary_key("transient");

        connector
            .translate(None, &en(), "Hallo", &TranslationOptions::default())
            .await
            .unwrap();

        let request = network.last_request().unwrap();
        assert_eq!(request.query_param("auth_key").as_deref(), Some("transient"));
        assert!(!connector.credential_is_temporary());
    }

    #[tokio::test]
    async fn test_credential_temporariness_is_per_variant() {
        let network = Arc::new(RecordingNetwork::responding(200, HELLO));
        let sdk = connector(config(ProtocolVariant::SdkMediated), network.clone());
        let modern = connector(config(ProtocolVariant::ModernPost), network);

        assert!(sdk.credential_is_temporary());
        assert!(!modern.credential_is_temporary());
    }

    #[tokio::test]
    async fn test_malformed_response_is_parse_error_and_not_cached() {
        let network = Arc::new(RecordingNetwork::responding(200, r#"{"response":"failed"}"#));
        let connector = connector(config(ProtocolVariant::ModernPost), network.clone());

        for _ in 0..2 {
            let err = connector
                .translate(Some(&de()), &en(), "Hallo", &TranslationOptions::default())
                .await
                .unwrap_err();
            assert!(matches!(err, TranslationError::ParseError { .. }));
        }
        assert_eq!(network.calls(), 2);
        assert_eq!(connector.cache_stats().await.entries, 0);
    }

    #[tokio::test]
    async fn test_oversized_text_is_truncated() {
        let network = Arc::new(RecordingNetwork::responding(200, HELLO));
        let connector = connector(config(ProtocolVariant::ModernPost), network.clone());
        let text = "a".repeat(6000);

        let result = connector
            .translate(None, &en(), &text, &TranslationOptions::default())
            .await
            .unwrap()
            .unwrap();
        assert!(result.truncated);

        let request = network.last_request().unwrap();
        let sent = request.form_param("text").unwrap();
        assert_eq!(sent.chars().count(), 5000);
        assert!(sent.ends_with("..."));
        assert!(sent.starts_with(&text[..4997]));
    }

    #[tokio::test]
    async fn test_repeated_calls_hit_network_once() {
        let network = Arc::new(RecordingNetwork::responding(200, HELLO));
        let connector = connector(config(ProtocolVariant::ModernPost), network.clone());

        for _ in 0..3 {
            let result = connector
                .translate(Some(&de()), &en(), "Hallo Welt!", &TranslationOptions::default())
                .await
                .unwrap()
                .unwrap();
            assert_eq!(result.translation, "Hello World!");
        }

        assert_eq!(network.calls(), 1);
        let stats = connector.cache_stats().await;
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.hits, 2);

        // another text is another key
        connector
            .translate(Some(&de()), &en(), "Hallo Welt", &TranslationOptions::default())
            .await
            .unwrap();
        assert_eq!(network.calls(), 2);

        connector.clear_cache().await;
        connector
            .translate(Some(&de()), &en(), "Hallo Welt!", &TranslationOptions::default())
            .await
            .unwrap();
        assert_eq!(network.calls(), 3);
    }

    #[tokio::test]
    async fn test_cache_can_be_disabled() {
        let network = Arc::new(RecordingNetwork::responding(200, HELLO));
        let connector = connector(
            ConnectorConfig {
                cache_enabled: false,
                ..Default::default()
            },
            network.clone(),
        );

        for _ in 0..2 {
            connector
                .translate(None, &en(), "Hallo", &TranslationOptions::default())
                .await
                .unwrap();
        }
        assert_eq!(network.calls(), 2);
    }

    #[tokio::test]
    async fn test_cancellation_is_not_cached() {
        let network = Arc::new(RecordingNetwork::responding(200, HELLO).with_delay(Duration::from_secs(5)));
        let connector = connector(config(ProtocolVariant::ModernPost), network.clone());
        let token = CancellationToken::new();

        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            canceller.cancel();
        });

        let err = connector
            .translate_cancellable(None, &en(), "Hallo", &TranslationOptions::default(), &token)
            .await
            .unwrap_err();

        assert!(matches!(err, TranslationError::CancelledError));
        assert_eq!(network.calls(), 1);
        assert_eq!(connector.cache_stats().await.entries, 0);
    }

    #[tokio::test]
    async fn test_legacy_empty_result_is_soft() {
        let network = Arc::new(RecordingNetwork::responding(200, r#"{"translations":[]}"#));
        let connector = connector(config(ProtocolVariant::LegacyGet), network.clone());

        for _ in 0..2 {
            let outcome = connector
                .translate(None, &en(), "Hallo", &TranslationOptions::default())
                .await
                .unwrap();
            assert_eq!(outcome, None);
        }
        assert_eq!(network.calls(), 2);
    }

    #[tokio::test]
    async fn test_entry_without_text_is_empty_on_either_parser() {
        let body = r#"{"translations":[{"detected_source_language":"DE","text":null}]}"#;

        let modern = connector(config(ProtocolVariant::ModernPost), Arc::new(RecordingNetwork::responding(200, body)));
        let err = modern
            .translate(None, &en(), "Hallo", &TranslationOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, TranslationError::EmptyResultError { .. }));

        let legacy = connector(
            ConnectorConfig {
                protocol: ProtocolVariant::LegacyGet,
                parser: Some(ParserKind::Fallback),
                ..Default::default()
            },
            Arc::new(RecordingNetwork::responding(200, body)),
        );
        let outcome = legacy
            .translate(None, &en(), "Hallo", &TranslationOptions::default())
            .await
            .unwrap();
        assert_eq!(outcome, None);
    }

    #[tokio::test]
    async fn test_concurrent_calls_share_one_cache() {
        let network = Arc::new(RecordingNetwork::responding(200, HELLO).with_delay(Duration::from_millis(50)));
        let connector = connector(config(ProtocolVariant::ModernPost), network.clone());
        let texts = ["eins", "zwei", "drei", "eins", "zwei", "eins"];

        let mut tasks = JoinSet::new();
        for text in texts {
            let connector = connector.clone();
            tasks.spawn(async move {
                connector
                    .translate(None, &en(), text, &TranslationOptions::default())
                    .await
            });
        }

        let mut finished = 0;
        while let Some(joined) = tasks.join_next().await {
            let result = joined.unwrap().unwrap().unwrap();
            assert_eq!(result.translation, "Hello World!");
            finished += 1;
        }
        assert_eq!(finished, texts.len());

        // concurrent misses on one key may each reach the network
        let calls = network.calls();
        assert!((3..=texts.len()).contains(&calls), "{} calls", calls);
        assert_eq!(connector.cache_stats().await.entries, 3);

        for text in ["eins", "zwei", "drei"] {
            connector
                .translate(None, &en(), text, &TranslationOptions::default())
                .await
                .unwrap();
        }
        assert_eq!(network.calls(), calls);
    }

    #[tokio::test]
    async fn test_modern_empty_result_is_error() {
        let network = Arc::new(RecordingNetwork::responding(200, r#"{"translations":[]}"#));
        let connector = connector(config(ProtocolVariant::ModernPost), network);

        let err = connector
            .translate(None, &en(), "Hallo", &TranslationOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, TranslationError::EmptyResultError { .. }));
    }

    #[tokio::test]
    async fn test_disabled_provider() {
        let network = Arc::new(RecordingNetwork::responding(200, HELLO));
        let connector = connector(
            ConnectorConfig {
                enabled: false,
                ..Default::default()
            },
            network.clone(),
        );

        let err = connector
            .translate(None, &en(), "Hallo", &TranslationOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "configuration");
        assert_eq!(network.calls(), 0);
    }

    #[tokio::test]
    async fn test_connection_failure() {
        let network = Arc::new(RecordingNetwork::refusing());
        let connector = connector(config(ProtocolVariant::ModernPost), network.clone());

        let err = connector
            .translate(None, &en(), "Hallo", &TranslationOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, TranslationError::ConnectionError { .. }));
        assert_eq!(network.calls(), 1);
    }

    #[tokio::test]
    async fn test_sdk_connection_failure_is_classified() {
        let network = Arc::new(RecordingNetwork::refusing());
        let connector = connector(config(ProtocolVariant::SdkMediated), network);

        let err = connector
            .translate(None, &en(), "Hallo", &TranslationOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, TranslationError::ConnectionError { .. }));
    }

    #[tokio::test]
    async fn test_output_is_normalized_against_sent_text() {
        let network = Arc::new(RecordingNetwork::responding(
            200,
            r#"{"translations":[{"text":"Tom &amp; <b0> Jerry</b0>"}]}"#,
        ));
        let connector = connector(config(ProtocolVariant::ModernPost), network);

        let result = connector
            .translate(None, &en(), "Tom & <b0>Jerry</b0>", &TranslationOptions::default())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(result.translation, "Tom & <b0>Jerry</b0>");
    }

    #[tokio::test]
    async fn test_project_segmentation_disables_splitting() {
        let network = Arc::new(RecordingNetwork::responding(200, HELLO));
        let connector = DeeplConnector::new(
            config(ProtocolVariant::ModernPost),
            network.clone(),
            keyed(),
            Arc::new(FixedProjectSettings::new(Some(true))),
        )
        .unwrap();

        connector
            .translate(None, &en(), "Hallo.", &TranslationOptions::default())
            .await
            .unwrap();
        assert_eq!(network.last_request().unwrap().form_param("split_sentences"), Some("0"));
    }

    #[tokio::test]
    async fn test_batch_keeps_order() {
        let network = Arc::new(RecordingNetwork::responding(200, HELLO));
        let connector = connector(config(ProtocolVariant::ModernPost), network.clone());

        let requests = vec![
            TranslationRequest::new("Hallo Welt!", en()).with_source_lang(de()),
            TranslationRequest::new("Hallo Welt!", en()).with_source_lang(de()),
            TranslationRequest::new("", Language::new("")),
        ];
        let results = connector.translate_batch(requests).await;

        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(results[1].is_ok());
        assert_eq!(results[2].as_ref().unwrap_err().code(), "configuration");
        assert_eq!(network.calls(), 1);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let result = DeeplConnector::new(
            ConnectorConfig {
                timeout_ms: 0,
                ..Default::default()
            },
            Arc::new(RecordingNetwork::responding(200, HELLO)),
            keyed(),
            Arc::new(FixedProjectSettings::default()),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_name_comes_from_catalog() {
        let connector = connector(
            config(ProtocolVariant::ModernPost),
            Arc::new(RecordingNetwork::responding(200, HELLO)),
        );
        assert_eq!(connector.name(), "DeepL Translate");
        assert_eq!(connector.variant(), ProtocolVariant::ModernPost);
    }

    #[tokio::test]
    async fn test_modern_end_to_end_over_http() {
        let app = Router::new().route(
            "/v2/translate",
            post(|Form(form): Form<HashMap<String, String>>| async move {
                let text = form.get("text").cloned().unwrap_or_default();
                Json(json!({
                    "translations": [{ "detected_source_language": "DE", "text": text.to_uppercase() }]
                }))
            }),
        );
        let base = spawn_stub(app).await;

        let connector = DeeplConnector::new(
            ConnectorConfig {
                protocol: ProtocolVariant::ModernPost,
                base_url: Some(base),
                ..Default::default()
            },
            Arc::new(ReqwestNetwork::new(Duration::from_secs(5)).unwrap()),
            keyed(),
            Arc::new(FixedProjectSettings::default()),
        )
        .unwrap();

        let result = connector
            .translate(Some(&de()), &en(), "hallo & tschüss", &TranslationOptions::default())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(result.translation, "HALLO & TSCHÜSS");
    }

    #[tokio::test]
    async fn test_sdk_end_to_end_over_http() {
        let app = Router::new().route(
            "/v2/translate",
            post(|Json(body): Json<Value>| async move {
                let text = body["text"][0].as_str().unwrap_or_default().to_string();
                let target = body["target_lang"].as_str().unwrap_or_default().to_string();
                Json(json!({
                    "translations": [{ "detected_source_language": "EN", "text": format!("[{}] {}", target, text) }]
                }))
            }),
        );
        let base = spawn_stub(app).await;

        let connector = DeeplConnector::new(
            ConnectorConfig {
                protocol: ProtocolVariant::SdkMediated,
                base_url: Some(base),
                ..Default::default()
            },
            Arc::new(ReqwestNetwork::new(Duration::from_secs(5)).unwrap()),
            keyed(),
            Arc::new(FixedProjectSettings::default()),
        )
        .unwrap();

        let result = connector
            .translate(None, &Language::parse("pt"), "Hello", &TranslationOptions::default())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(result.translation, "[PT-BR] Hello");
        assert_eq!(result.detected_source_lang.as_deref(), Some("EN"));
    }

    #[tokio::test]
    async fn test_request_body_is_json_for_sdk() {
        let network = Arc::new(RecordingNetwork::responding(200, HELLO));
        let connector = connector(config(ProtocolVariant::SdkMediated), network.clone());

        connector
            .translate(None, &en(), "Hallo", &TranslationOptions::default())
            .await
            .unwrap();

        let request = network.last_request().unwrap();
        assert!(matches!(request.body, Some(RequestBody::Json(_))));
        assert_eq!(request.header("Authorization"), Some("DeepL-Auth-Key secret-v2"));
    }
}
