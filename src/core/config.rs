//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

use crate::core::errors::{Result, TranslationError};
use crate::core::messages::MessageCatalog;
use crate::core::models::ProtocolVariant;
use crate::processors::response::ParserKind;
use crate::protocol::sdk::DeepLApiVersion;

/// Provider maximum text length in characters
pub const MAX_TEXT_LENGTH: usize = 5000;

/// Preference gating the legacy and modern connectors
pub const ALLOW_DEEPL_TRANSLATE: &str = "allow_deepl_translate";

/// Preference gating the SDK-mediated connector
pub const ALLOW_DEEPL_V2API_TRANSLATE: &str = "allow_deepl_v2api_translate";

/// Connector configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectorConfig {
    pub protocol: ProtocolVariant,
    /// Overrides the provider host; meant for tests against a local stub
    pub base_url: Option<String>,
    /// REST version for the SDK-mediated protocol
    pub api_version: DeepLApiVersion,
    /// Overrides the protocol's response parser
    pub parser: Option<ParserKind>,
    pub max_text_length: usize,
    pub filler: String,
    /// Provider allowed by the user
    pub enabled: bool,
    pub cache_enabled: bool,
    pub timeout_ms: u64,
    pub messages: MessageCatalog,
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            protocol: ProtocolVariant::ModernPost,
            base_url: None,
            api_version: DeepLApiVersion::default(),
            parser: None,
            max_text_length: MAX_TEXT_LENGTH,
            filler: "...".to_string(),
            enabled: true,
            cache_enabled: true,
            timeout_ms: 30000,
            messages: MessageCatalog::default(),
        }
    }
}

fn env_flag(name: &str, default: bool) -> Result<bool> {
    match std::env::var(name) {
        Ok(value) => match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => Err(TranslationError::config(format!("{} must be a boolean, got {}", name, other))),
        },
        Err(_) => Ok(default),
    }
}

fn env_number<T: std::str::FromStr>(name: &str, default: T) -> Result<T> {
    match std::env::var(name) {
        Ok(value) => value
            .trim()
            .parse::<T>()
            .map_err(|_| TranslationError::config(format!("{} must be a number, got {}", name, value))),
        Err(_) => Ok(default),
    }
}

impl ConnectorConfig {
    /// Load configuration from `DEEPL_*` environment variables
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let protocol = match std::env::var("DEEPL_PROTOCOL") {
            Ok(value) => value.parse::<ProtocolVariant>().map_err(TranslationError::config)?,
            Err(_) => defaults.protocol,
        };

        let base_url = std::env::var("DEEPL_BASE_URL").ok().filter(|url| !url.trim().is_empty());

        let api_version = match std::env::var("DEEPL_API_VERSION").as_deref() {
            Ok("v1") | Ok("1") => DeepLApiVersion::Version1,
            Ok("v2") | Ok("2") | Err(_) => DeepLApiVersion::Version2,
            Ok(other) => return Err(TranslationError::config(format!("unknown DEEPL_API_VERSION: {}", other))),
        };

        let parser = match std::env::var("DEEPL_PARSER").as_deref() {
            Ok("structured") => Some(ParserKind::Structured),
            Ok("fallback") => Some(ParserKind::Fallback),
            Ok(other) => return Err(TranslationError::config(format!("unknown DEEPL_PARSER: {}", other))),
            Err(_) => None,
        };

        let max_text_length = env_number("DEEPL_MAX_TEXT_LENGTH", defaults.max_text_length)?;

        let filler = std::env::var("DEEPL_FILLER").unwrap_or(defaults.filler);

        let timeout_ms = env_number("DEEPL_TIMEOUT_MS", defaults.timeout_ms)?;

        Ok(Self {
            protocol,
            base_url,
            api_version,
            parser,
            max_text_length,
            filler,
            enabled: env_flag("DEEPL_ENABLED", true)?,
            cache_enabled: env_flag("DEEPL_CACHE_ENABLED", true)?,
            timeout_ms,
            messages: defaults.messages,
        })
    }

    /// Layer defaults, an optional settings file and `DEEPL_*` variables.
    ///
    /// Nested keys use `__`, e.g. `DEEPL_MESSAGES__ENGINE_NAME`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder().add_source(config::Config::try_from(&Self::default())?);

        if let Some(path) = path {
            info!("Loading settings from {}", path.display());
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix("DEEPL")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Load from JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_text_length <= self.filler.chars().count() {
            return Err(TranslationError::config(format!(
                "max_text_length ({}) must exceed the filler length ({})",
                self.max_text_length,
                self.filler.chars().count()
            )));
        }

        if self.timeout_ms == 0 {
            return Err(TranslationError::config("timeout_ms must be greater than 0"));
        }

        if let Some(url) = &self.base_url {
            if url::Url::parse(url).is_err() {
                return Err(TranslationError::config(format!("base_url is not a valid URL: {}", url)));
            }
            warn!("Provider host overridden with {}", url);
        }

        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Preference that allows this connector
    pub fn preference_name(&self) -> &'static str {
        match self.protocol {
            ProtocolVariant::SdkMediated => ALLOW_DEEPL_V2API_TRANSLATE,
            ProtocolVariant::LegacyGet | ProtocolVariant::ModernPost => ALLOW_DEEPL_TRANSLATE,
        }
    }
}
