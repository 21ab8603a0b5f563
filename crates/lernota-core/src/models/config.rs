//! Configuration for the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment variable holding the AI service credential.
pub const API_KEY_VAR: &str = "GOOGLE_API_KEY";

/// Main configuration for the lernota pipeline.
///
/// Only the AI-assisted stage reads any of this; the XML and pattern paths
/// take no configuration at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Model identifier sent to the generative service.
    pub model: String,

    /// API credential. `None` makes the AI stage fail over to the pattern
    /// fallback; the XML path is unaffected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL of the generative service.
    pub api_base: String,

    /// Upper bound on the number of raw-text characters included in the
    /// prompt. Text beyond this prefix is never sent.
    pub max_prompt_chars: usize,

    /// Request timeout in seconds for the single AI call.
    pub request_timeout_secs: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.0-flash".to_string(),
            api_key: None,
            api_base: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            max_prompt_chars: 8000,
            request_timeout_secs: 60,
        }
    }
}

impl PipelineConfig {
    /// Default configuration with the credential taken from the
    /// environment, if present.
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var(API_KEY_VAR).ok().filter(|k| !k.is_empty()),
            ..Self::default()
        }
    }

    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, content)
    }

    /// Request timeout as a [`Duration`].
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.model, "gemini-2.0-flash");
        assert_eq!(config.api_key, None);
        assert_eq!(config.max_prompt_chars, 8000);
        assert_eq!(config.request_timeout(), Duration::from_secs(60));
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let config: PipelineConfig = serde_json::from_str(r#"{"model":"gemma-2-9b-it"}"#).unwrap();
        assert_eq!(config.model, "gemma-2-9b-it");
        assert_eq!(config.max_prompt_chars, 8000);
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lernota.json");

        let mut config = PipelineConfig::default();
        config.model = "gemini-1.5-flash".to_string();
        config.save(&path).unwrap();

        let loaded = PipelineConfig::from_file(&path).unwrap();
        assert_eq!(loaded.model, "gemini-1.5-flash");
    }
}
