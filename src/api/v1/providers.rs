//! Provider listing endpoint

use axum::extract::State;
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::{Json, ProviderInfo, ProvidersResponse};

/// GET /v1/providers
pub async fn list_providers(State(state): State<AppState>) -> Json<ProvidersResponse> {
    let mut providers = Vec::with_capacity(state.registry.len());

    for config in state.registry.providers() {
        let configured = state.credentials.supports(config.credential_name()).await;
        providers.push(ProviderInfo::from_config(config, configured));
    }

    debug!(count = providers.len(), "Listing providers");
    Json(ProvidersResponse::new(providers))
}
