//! Application state for shared services

use std::sync::Arc;

use crate::config::{CorsConfig, GatewayConfig};
use crate::domain::CredentialProvider;
use crate::infrastructure::llm::ProviderRegistry;
use crate::infrastructure::services::{ChatServiceTrait, ExtractionService};

/// Application state containing shared services using dynamic dispatch
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ProviderRegistry>,
    pub credentials: Arc<dyn CredentialProvider>,
    pub chat_service: Arc<dyn ChatServiceTrait>,
    pub extraction_service: ExtractionService,
    pub gateway: Arc<GatewayConfig>,
    pub cors: Arc<CorsConfig>,
}

impl AppState {
    pub fn new(
        registry: Arc<ProviderRegistry>,
        credentials: Arc<dyn CredentialProvider>,
        chat_service: Arc<dyn ChatServiceTrait>,
        gateway: GatewayConfig,
        cors: CorsConfig,
    ) -> Self {
        let extraction_service = ExtractionService::new(chat_service.clone());

        Self {
            registry,
            credentials,
            chat_service,
            extraction_service,
            gateway: Arc::new(gateway),
            cors: Arc::new(cors),
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("providers", &self.registry.len())
            .field("gateway", &self.gateway)
            .field("cors", &self.cors)
            .finish_non_exhaustive()
    }
}
