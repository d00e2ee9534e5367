//! Non-streaming chat endpoint

use axum::extract::{Path, State};
use tracing::{info, warn};

use crate::api::middleware::{RequestId, RequireAuthorization};
use crate::api::state::AppState;
use crate::api::types::{ApiError, ChatRequestBody, Json};
use crate::domain::{ChatRequest, ChatResponse};

/// POST /v1/{provider}/chat
pub async fn chat(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    RequestId(request_id): RequestId,
    _auth: RequireAuthorization,
    Json(body): Json<ChatRequestBody>,
) -> Result<Json<ChatResponse>, ApiError> {
    let request: ChatRequest = body.into();

    info!(
        request_id = %request_id,
        provider = %provider,
        model = request.model.as_deref().unwrap_or("default"),
        messages = request.messages.len(),
        "Processing chat request"
    );

    let response = state
        .chat_service
        .complete(&provider, request)
        .await
        .map_err(|e| {
            warn!(request_id = %request_id, provider = %provider, kind = %e.kind(), error = %e, "Chat request failed");
            ApiError::from(e)
        })?;

    Ok(Json(response))
}
