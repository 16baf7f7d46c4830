//! LLM provider factory.
//!
//! Resolves a provider name into a concrete client. A missing credential is
//! reported as an error string so callers can fall back to local answering
//! instead of failing.

use crate::client::LlmClient;
use crate::providers::{OllamaClient, OpenAiClient};
use crate::types::ProviderType;
use std::sync::Arc;
use std::time::Duration;

/// Default request timeout when the provider config sets none.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Create an LLM client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier ("openai", "ollama")
/// * `endpoint` - Optional custom endpoint URL
/// * `api_key` - Optional API key (blank keys count as missing)
/// * `timeout` - Per-request timeout
///
/// # Errors
/// Returns error if the provider is unknown or a required key is missing.
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
    timeout: Duration,
) -> Result<Arc<dyn LlmClient>, String> {
    let provider_type =
        ProviderType::parse(provider).ok_or_else(|| format!("Unknown provider: {}", provider))?;

    let api_key = api_key.map(str::trim).filter(|key| !key.is_empty());

    match provider_type {
        ProviderType::OpenAI => {
            let key = api_key.ok_or_else(|| "OpenAI provider requires API key".to_string())?;
            let url = endpoint.unwrap_or(OpenAiClient::DEFAULT_URL);
            Ok(Arc::new(OpenAiClient::new(url, key, timeout)?))
        }
        ProviderType::Ollama => {
            let base_url = endpoint.unwrap_or(OllamaClient::DEFAULT_URL);
            Ok(Arc::new(OllamaClient::with_timeout(base_url, timeout)?))
        }
    }
}
