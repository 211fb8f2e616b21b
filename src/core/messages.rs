//! User-facing message catalog
//!
//! Passed into the connector through its configuration instead of a
//! process-wide resource bundle.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageCatalog {
    pub engine_name: String,
    pub api_key_not_found: String,
    pub connection_error: String,
    pub encoding_error: String,
    pub json_parse_error: String,
    pub json_empty_error: String,
    pub interruption_error: String,
    /// `{source}` and `{target}` are replaced with provider codes
    pub general_error: String,
    pub provider_disabled: String,
    pub unmapped_target: String,
}

impl Default for MessageCatalog {
    fn default() -> Self {
        Self {
            engine_name: "DeepL Translate".to_string(),
            api_key_not_found: "DeepL API key not found. Please set the key in the machine translation preferences."
                .to_string(),
            connection_error: "Could not connect to the DeepL server.".to_string(),
            encoding_error: "Could not encode the DeepL request.".to_string(),
            json_parse_error: "Could not parse the DeepL response.".to_string(),
            json_empty_error: "DeepL returned no translation.".to_string(),
            interruption_error: "DeepL translation was interrupted.".to_string(),
            general_error: "DeepL translation from {source} to {target} failed.".to_string(),
            provider_disabled: "DeepL translation is disabled in the preferences.".to_string(),
            unmapped_target: "Target language cannot be mapped to a DeepL language code.".to_string(),
        }
    }
}

impl MessageCatalog {
    pub fn general_error_for(&self, source: &str, target: &str) -> String {
        self.general_error
            .replace("{source}", source)
            .replace("{target}", target)
    }
}
