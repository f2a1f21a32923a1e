//! Generation backend abstraction.
//!
//! The memory engine consumes a single capability from the text generator:
//! turn a prompt into text. The segmenter and the classifier are built on
//! top of that capability and degrade gracefully when it fails.

mod ollama;

pub use ollama::OllamaClient;

use crate::Result;
use serde_json::Value;
use std::time::Duration;

/// Trait for generation backends.
pub trait LlmProvider: Send + Sync {
    /// The provider name.
    fn name(&self) -> &'static str;

    /// Generates a completion for the given prompt.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable or answers with an
    /// error status.
    fn complete(&self, prompt: &str) -> Result<String>;
}

/// HTTP client configuration for generation backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LlmHttpConfig {
    /// Request timeout in milliseconds (0 to disable).
    pub timeout_ms: u64,
    /// Connect timeout in milliseconds (0 to disable).
    pub connect_timeout_ms: u64,
}

impl Default for LlmHttpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 120_000,
            connect_timeout_ms: 3_000,
        }
    }
}

impl LlmHttpConfig {
    /// Builds HTTP settings from the resolved backend configuration.
    #[must_use]
    pub const fn from_config(config: &crate::config::LlmConfig) -> Self {
        Self {
            timeout_ms: config.timeout_ms,
            connect_timeout_ms: config.connect_timeout_ms,
        }
    }
}

/// Builds a blocking HTTP client for generation requests with configured timeouts.
#[must_use]
pub fn build_http_client(config: LlmHttpConfig) -> reqwest::blocking::Client {
    let mut builder = reqwest::blocking::Client::builder();
    if config.timeout_ms > 0 {
        builder = builder.timeout(Duration::from_millis(config.timeout_ms));
    }
    if config.connect_timeout_ms > 0 {
        builder = builder.connect_timeout(Duration::from_millis(config.connect_timeout_ms));
    }

    builder.build().unwrap_or_else(|err| {
        tracing::warn!("Failed to build LLM HTTP client: {err}");
        reqwest::blocking::Client::new()
    })
}

/// Extracts a JSON array from model output.
///
/// The whole response is tried first; models often wrap the payload in
/// prose or code fences, so the slice between the first `[` and the last
/// `]` is tried next. Anything that is not an array yields `None`.
///
/// # Example
///
/// ```rust
/// use aurora_memory::llm::extract_json_array;
///
/// let items = extract_json_array("Here you go:\n[{\"data\": \"x\"}]\nDone").unwrap();
/// assert_eq!(items.len(), 1);
/// assert!(extract_json_array("no json").is_none());
/// ```
#[must_use]
pub fn extract_json_array(text: &str) -> Option<Vec<Value>> {
    if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(text.trim()) {
        return Some(items);
    }

    let start = text.find('[')?;
    let end = text.rfind(']')?;
    if end <= start {
        return None;
    }
    match serde_json::from_str::<Value>(&text[start..=end]) {
        Ok(Value::Array(items)) => Some(items),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_array_raw() {
        let items = extract_json_array(r#"[{"data": "a"}, {"data": "b"}]"#).unwrap();
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn test_extract_json_array_markdown() {
        let response = "```json\n[{\"category\": \"identity\", \"data\": \"meu nome e Ana\"}]\n```";
        let items = extract_json_array(response).unwrap();
        assert_eq!(items[0]["category"], "identity");
    }

    #[test]
    fn test_extract_json_array_rejects_objects() {
        assert!(extract_json_array(r#"{"data": "a"}"#).is_none());
    }

    #[test]
    fn test_extract_json_array_malformed() {
        assert!(extract_json_array("[not json").is_none());
        assert!(extract_json_array("] reversed [").is_none());
        assert!(extract_json_array("[{\"data\": }]").is_none());
    }

    #[test]
    fn test_http_config_from_config() {
        let llm = crate::config::LlmConfig {
            timeout_ms: 5,
            connect_timeout_ms: 7,
            ..crate::config::LlmConfig::default()
        };
        let http = LlmHttpConfig::from_config(&llm);
        assert_eq!(http.timeout_ms, 5);
        assert_eq!(http.connect_timeout_ms, 7);
    }
}
