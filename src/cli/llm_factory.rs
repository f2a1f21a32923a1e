//! Generation backend factory functions for CLI commands.

use std::sync::Arc;

use crate::config::{AuroraConfig, LlmConfig};
use crate::llm::{LlmProvider, OllamaClient};

/// Builds an Ollama client from configuration.
#[must_use]
pub fn build_ollama_client(llm_config: &LlmConfig) -> OllamaClient {
    OllamaClient::from_config(llm_config)
}

/// Builds the generation backend shared by the segmenter and classifier.
///
/// Returns `None` when every feature that needs a backend is disabled.
#[must_use]
pub fn build_llm_provider(config: &AuroraConfig) -> Option<Arc<dyn LlmProvider>> {
    if !config.features.uses_backend() {
        tracing::debug!("Generation backend disabled by feature flags");
        return None;
    }
    let client = build_ollama_client(&config.llm);
    tracing::debug!(model = client.model(), "Using Ollama generation backend");
    Some(Arc::new(client))
}
