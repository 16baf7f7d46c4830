//! Builds the chat service from application and RAG configuration.

use docchat_core::{config::AppConfig, AppResult};
use docchat_llm::{create_client, factory::DEFAULT_TIMEOUT, LlmClient};
use docchat_prompt::{load_prompt, ANSWER_PROMPT_ID};
use docchat_rag::{load_config, ChatService, RagConfig};
use std::sync::Arc;
use std::time::Duration;

/// Generative collaborator for the configured provider, if one can be
/// built. A missing key or unknown provider means local fallback answers.
pub fn resolve_llm(config: &AppConfig) -> Option<Arc<dyn LlmClient>> {
    let provider_config = config.provider_config(&config.provider);
    let endpoint = provider_config.and_then(|pc| pc.endpoint());
    let timeout = provider_config
        .and_then(|pc| pc.timeout_secs())
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_TIMEOUT);
    let api_key = config.resolve_api_key(&config.provider);

    match create_client(&config.provider, endpoint, api_key.as_deref(), timeout) {
        Ok(client) => {
            tracing::debug!("Using {} for generation", client.provider_name());
            Some(client)
        }
        Err(e) => {
            tracing::warn!("Generative answers disabled: {}", e);
            None
        }
    }
}

/// Load `.docchat/rag.yaml` and wire a [`ChatService`].
pub fn build_service(config: &AppConfig) -> AppResult<(ChatService, RagConfig)> {
    let rag_config = load_config(&config.workspace)?;
    let prompt = load_prompt(&config.workspace, ANSWER_PROMPT_ID)?;
    let llm = resolve_llm(config);

    let service = ChatService::from_config(
        &config.workspace,
        &rag_config,
        llm,
        &config.model,
        prompt,
    )?;

    Ok((service, rag_config))
}
