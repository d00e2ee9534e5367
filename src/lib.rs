//! LLM Relay Gateway
//!
//! A provider-agnostic relay in front of OpenAI, Anthropic and Gemini:
//! - one normalized chat request/response shape for every provider
//! - streaming relay with ordered, cancellable chunk delivery
//! - structured action extraction validated against composed JSON Schemas

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use api::state::AppState;
use domain::CredentialProvider;
use infrastructure::credentials::EnvCredentialProvider;
use infrastructure::llm::{HttpClient, ProviderRegistry};
use infrastructure::services::{ChatService, ChatServiceConfig};
use tracing::info;

/// Create the application state from configuration, reading credentials from the environment
pub fn create_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    create_app_state_with_credentials(config, Arc::new(EnvCredentialProvider::new()))
}

/// Create the application state with a custom credential source
pub fn create_app_state_with_credentials(
    config: &AppConfig,
    credentials: Arc<dyn CredentialProvider>,
) -> anyhow::Result<AppState> {
    let registry = Arc::new(create_registry(config)?);

    info!(
        providers = ?registry.providers().map(|p| p.id().as_str()).collect::<Vec<_>>(),
        credentials = credentials.provider_name(),
        "Provider registry initialized"
    );

    let chat_service = Arc::new(ChatService::with_config(
        registry.clone(),
        credentials.clone(),
        Arc::new(HttpClient::new()),
        ChatServiceConfig {
            request_timeout: config.gateway.request_timeout(),
            stream_buffer: config.gateway.stream_buffer.max(1),
        },
    ));

    Ok(AppState::new(
        registry,
        credentials,
        chat_service,
        config.gateway.clone(),
        config.cors.clone(),
    ))
}

/// Registry restricted to the enabled providers, with base URL overrides applied
pub fn create_registry(config: &AppConfig) -> anyhow::Result<ProviderRegistry> {
    let enabled = config.gateway.provider_ids()?;
    let base_urls = config.gateway.base_url_overrides()?;

    let registry = ProviderRegistry::configured(&enabled, &base_urls);
    if registry.is_empty() {
        anyhow::bail!("No providers enabled");
    }

    Ok(registry)
}
