//! Custom error types for translation operations

use thiserror::Error;

/// Boxed cause carried by errors for logging
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Translation-related errors
#[derive(Error, Debug)]
pub enum TranslationError {
    /// No persisted credential and no transient key
    #[error("{message}")]
    CredentialMissingError {
        message: String,
    },

    /// Target language cannot be mapped, provider disabled, or invalid settings
    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
    },

    /// Transport failure (DNS, refused, timeout, TLS)
    #[error("Connection error: {message}")]
    ConnectionError {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// Request could not be serialized
    #[error("Encoding error: {message}")]
    EncodingError {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// Response malformed
    #[error("Parse error: {message}")]
    ParseError {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// Well-formed response carrying no translation
    #[error("Empty result: {message}")]
    EmptyResultError {
        message: String,
    },

    /// Provider answered with a failure status or the vendor client failed
    #[error("Provider error: {message}")]
    ProviderError {
        status: Option<u16>,
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// Call abandoned by the caller
    #[error("Translation cancelled")]
    CancelledError,

    /// Wrapper for anyhow errors
    #[error("Internal error: {0}")]
    InternalError(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Layered settings error
    #[error("Settings error: {0}")]
    SettingsError(#[from] config::ConfigError),
}

impl TranslationError {
    pub fn connection(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        TranslationError::ConnectionError {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn encoding(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        TranslationError::EncodingError {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn parse(message: impl Into<String>, source: Option<BoxError>) -> Self {
        TranslationError::ParseError {
            message: message.into(),
            source,
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        TranslationError::ConfigError {
            message: message.into(),
        }
    }

    /// Stable short code used in logs and API error bodies
    pub fn code(&self) -> &'static str {
        match self {
            TranslationError::CredentialMissingError { .. } => "credential_missing",
            TranslationError::ConfigError { .. } => "configuration",
            TranslationError::ConnectionError { .. } => "connection",
            TranslationError::EncodingError { .. } => "encoding",
            TranslationError::ParseError { .. } => "parse",
            TranslationError::EmptyResultError { .. } => "empty_result",
            TranslationError::ProviderError { .. } => "provider",
            TranslationError::CancelledError => "cancelled",
            TranslationError::InternalError(_)
            | TranslationError::IoError(_)
            | TranslationError::JsonError(_)
            | TranslationError::SettingsError(_) => "internal",
        }
    }
}

impl From<anyhow::Error> for TranslationError {
    fn from(err: anyhow::Error) -> Self {
        TranslationError::InternalError(err.to_string())
    }
}

/// Result type for translation operations
pub type Result<T> = std::result::Result<T, TranslationError>;
