//! DeepL machine-translation connector
//!
//! Translates text spans through DeepL's legacy GET, modern POST or
//! SDK-mediated interfaces, with language-code mapping, truncation, response
//! normalization and a per-instance result cache.

#![forbid(unsafe_code)]

pub mod cli;
pub mod core;
pub mod processors;
pub mod protocol;
pub mod server;

// Re-export key types for convenience
pub use core::{
    cache::{CacheKey, CacheStats, TranslationCache},
    client::DeeplConnector,
    config::ConnectorConfig,
    credentials::{CredentialStore, EnvCredentialStore, ProjectSettings, StaticCredentialStore},
    errors::{Result, TranslationError},
    models::{Language, ProtocolVariant, TagHandling, TranslationOptions, TranslationRequest, TranslationResult},
    network::{NetworkClient, ReqwestNetwork},
};

pub use protocol::TranslationProtocol;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
