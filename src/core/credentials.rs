//! Credential and project-settings collaborators
//!
//! Both are read-only from the connector's point of view. Storage policy
//! (persisted vs. temporary keys) belongs to the implementor.

use std::collections::HashMap;

/// Credential key for the legacy and modern protocols
pub const PROPERTY_API_KEY: &str = "deepl.api.key";

/// Credential key for the SDK-mediated protocol
pub const PROPERTY_V2_API_KEY: &str = "deepl.v2api.key";

/// Source of API keys
pub trait CredentialStore: Send + Sync {
    fn get_credential(&self, key: &str) -> Option<String>;

    fn is_temporary(&self, key: &str) -> bool;
}

/// Host project settings
pub trait ProjectSettings: Send + Sync {
    /// `None` means unknown; the provider default applies
    fn is_sentence_segmenting_enabled(&self) -> Option<bool>;
}

/// Reads credentials from environment variables.
///
/// `deepl.api.key` is looked up as `DEEPL_API_KEY`, `deepl.v2api.key` as
/// `DEEPL_V2API_KEY`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvCredentialStore;

impl EnvCredentialStore {
    pub fn env_var_name(key: &str) -> String {
        key.to_uppercase().replace('.', "_")
    }
}

impl CredentialStore for EnvCredentialStore {
    fn get_credential(&self, key: &str) -> Option<String> {
        std::env::var(Self::env_var_name(key))
            .ok()
            .filter(|value| !value.trim().is_empty())
    }

    fn is_temporary(&self, _key: &str) -> bool {
        false
    }
}

/// In-memory credentials
#[derive(Debug, Clone, Default)]
pub struct StaticCredentialStore {
    entries: HashMap<String, (String, bool)>,
}

impl StaticCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credential(mut self, key: &str, value: impl Into<String>, temporary: bool) -> Self {
        self.entries.insert(key.to_string(), (value.into(), temporary));
        self
    }
}

impl CredentialStore for StaticCredentialStore {
    fn get_credential(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|(value, _)| value.clone())
    }

    fn is_temporary(&self, key: &str) -> bool {
        self.entries.get(key).map(|(_, temporary)| *temporary).unwrap_or(false)
    }
}

/// Fixed segmentation answer, `None` when the host has no project open
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedProjectSettings {
    pub sentence_segmenting: Option<bool>,
}

impl FixedProjectSettings {
    pub fn new(sentence_segmenting: Option<bool>) -> Self {
        Self { sentence_segmenting }
    }
}

impl ProjectSettings for FixedProjectSettings {
    fn is_sentence_segmenting_enabled(&self) -> Option<bool> {
        self.sentence_segmenting
    }
}
