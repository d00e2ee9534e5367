//! Structured action extraction endpoint

use axum::extract::{Path, State};
use tracing::{debug, info, warn};

use crate::api::middleware::{truncate_for_log, RequestId, RequireAuthorization};
use crate::api::state::AppState;
use crate::api::types::{ApiError, ExtractRequestBody, ExtractResponseBody, Json};
use crate::infrastructure::services::ExtractionRequest;

/// POST /v1/{provider}/extract
pub async fn extract(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    RequestId(request_id): RequestId,
    _auth: RequireAuthorization,
    Json(body): Json<ExtractRequestBody>,
) -> Result<Json<ExtractResponseBody>, ApiError> {
    let request: ExtractionRequest = body.into();

    info!(
        request_id = %request_id,
        provider = %provider,
        actions = request.actions.len(),
        "Processing extraction request"
    );

    let outcome = state
        .extraction_service
        .extract(&provider, request)
        .await
        .map_err(|e| {
            warn!(request_id = %request_id, provider = %provider, error = %e, "Extraction failed");
            ApiError::from(e)
        })?;

    debug!(
        request_id = %request_id,
        raw = %truncate_for_log(&outcome.raw, 500),
        "Extraction raw output"
    );

    Ok(Json(outcome.into()))
}

