//! Provider listing types

use serde::{Deserialize, Serialize};

use crate::domain::ProviderId;
use crate::infrastructure::llm::ProviderConfig;

/// One registry entry as reported by `GET /v1/providers`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderInfo {
    pub id: ProviderId,
    pub default_model: String,
    /// Whether the provider enforces a response schema natively
    pub structured_output: bool,
    pub credential_configured: bool,
}

impl ProviderInfo {
    pub fn from_config(config: &ProviderConfig, credential_configured: bool) -> Self {
        Self {
            id: config.id(),
            default_model: config.default_model().to_string(),
            structured_output: config.supports_native_schema(),
            credential_configured,
        }
    }
}

/// List providers response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersResponse {
    pub providers: Vec<ProviderInfo>,
}

impl ProvidersResponse {
    pub fn new(providers: Vec<ProviderInfo>) -> Self {
        Self { providers }
    }
}
