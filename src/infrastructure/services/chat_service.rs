//! Chat service: one provider call per request, plain or streamed

use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::time::timeout;
use tracing::{debug, info, instrument};

#[cfg(test)]
use mockall::automock;

use crate::domain::{ChatRequest, ChatResponse, ChunkStream, CredentialProvider, DomainError};
use crate::infrastructure::llm::{
    decode_units, spawn_relay, Headers, HttpClientTrait, ProviderConfig, ProviderRegistry,
};

/// Chat service configuration
#[derive(Debug, Clone)]
pub struct ChatServiceConfig {
    /// Ceiling for one provider call; for streams, for opening the stream
    pub request_timeout: Duration,
    /// Capacity of the channel between the relay task and the reader
    pub stream_buffer: usize,
}

impl Default for ChatServiceConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(300),
            stream_buffer: 32,
        }
    }
}

/// Trait for the chat service (for dynamic dispatch in AppState)
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ChatServiceTrait: Send + Sync + Debug {
    /// Perform one non-streaming call and normalize the reply
    async fn complete(&self, provider: &str, request: ChatRequest)
        -> Result<ChatResponse, DomainError>;

    /// Open a provider stream and relay it as sequenced chunks
    async fn open_stream(&self, provider: &str, request: ChatRequest)
        -> Result<ChunkStream, DomainError>;
}

/// Everything needed for one outbound call
struct PreparedCall {
    config: ProviderConfig,
    model: String,
    url: String,
    headers: Headers,
    body: Value,
}

/// Chat service implementation
#[derive(Debug)]
pub struct ChatService {
    registry: Arc<ProviderRegistry>,
    credentials: Arc<dyn CredentialProvider>,
    client: Arc<dyn HttpClientTrait>,
    config: ChatServiceConfig,
}

impl ChatService {
    pub fn new(
        registry: Arc<ProviderRegistry>,
        credentials: Arc<dyn CredentialProvider>,
        client: Arc<dyn HttpClientTrait>,
    ) -> Self {
        Self::with_config(registry, credentials, client, ChatServiceConfig::default())
    }

    pub fn with_config(
        registry: Arc<ProviderRegistry>,
        credentials: Arc<dyn CredentialProvider>,
        client: Arc<dyn HttpClientTrait>,
        config: ChatServiceConfig,
    ) -> Self {
        Self {
            registry,
            credentials,
            client,
            config,
        }
    }

    /// Validation, provider lookup and credential resolution; no I/O to the provider
    async fn prepare(
        &self,
        provider: &str,
        request: &ChatRequest,
        stream: bool,
    ) -> Result<PreparedCall, DomainError> {
        request.validate()?;

        let config = self.registry.lookup(provider)?;
        let credential = self
            .credentials
            .get_credential(config.credential_name())
            .await?;

        let model = config.resolve_model(request).to_string();
        let url = config.request_url(&model, stream, credential.api_key())?;
        let headers = config.headers(credential.api_key());
        let body = config.build_body(request, &model, stream);

        Ok(PreparedCall {
            config: config.clone(),
            model,
            url,
            headers,
            body,
        })
    }

    fn timeout_error(&self) -> DomainError {
        DomainError::timeout(self.config.request_timeout)
    }
}

#[async_trait]
impl ChatServiceTrait for ChatService {
    #[instrument(skip(self, request), fields(provider = %provider))]
    async fn complete(
        &self,
        provider: &str,
        request: ChatRequest,
    ) -> Result<ChatResponse, DomainError> {
        let call = self.prepare(provider, &request, false).await?;
        debug!(model = %call.model, endpoint = %call.config.endpoint(&call.model, false), "Calling provider");

        let json = timeout(
            self.config.request_timeout,
            self.client.post_json(&call.url, &call.headers, &call.body),
        )
        .await
        .map_err(|_| self.timeout_error())??;

        let response = call.config.parse_response(json)?;

        info!(
            model = %call.model,
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            total_tokens = response.usage.total(),
            "Provider call completed"
        );

        Ok(response)
    }

    #[instrument(skip(self, request), fields(provider = %provider))]
    async fn open_stream(
        &self,
        provider: &str,
        request: ChatRequest,
    ) -> Result<ChunkStream, DomainError> {
        let call = self.prepare(provider, &request, true).await?;
        debug!(model = %call.model, endpoint = %call.config.endpoint(&call.model, true), "Opening provider stream");

        let bytes = timeout(
            self.config.request_timeout,
            self.client
                .post_json_stream(&call.url, &call.headers, &call.body),
        )
        .await
        .map_err(|_| self.timeout_error())??;

        info!(model = %call.model, "Provider stream opened");

        let units = decode_units(call.config, bytes);
        Ok(spawn_relay(units, self.config.stream_buffer))
    }
}
