//! Streaming chat endpoint (server-sent events)

use std::convert::Infallible;

use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::{Stream, StreamExt};
use tracing::{error, info, trace, warn};

use crate::api::middleware::{RequestId, RequireAuthorization};
use crate::api::state::AppState;
use crate::api::types::{stream_event_payload, ApiError, ChatRequestBody, Json};
use crate::domain::{ChatRequest, StreamEvent};

/// POST /v1/{provider}/chat/stream
///
/// Failures before the provider stream opens are plain error responses;
/// later failures arrive as one terminal `{"error": ...}` event.
pub async fn chat_stream(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    RequestId(request_id): RequestId,
    _auth: RequireAuthorization,
    Json(body): Json<ChatRequestBody>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let request: ChatRequest = body.into();

    info!(
        request_id = %request_id,
        provider = %provider,
        model = request.model.as_deref().unwrap_or("default"),
        "Opening chat stream"
    );

    let chunks = state
        .chat_service
        .open_stream(&provider, request)
        .await
        .map_err(|e| {
            warn!(request_id = %request_id, provider = %provider, kind = %e.kind(), error = %e, "Stream could not be opened");
            ApiError::from(e)
        })?;

    let events = chunks.map(move |event| Ok::<_, Infallible>(to_sse_event(&request_id, &event)));

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

fn to_sse_event(request_id: &str, event: &StreamEvent) -> Event {
    match event {
        StreamEvent::Chunk(chunk) if chunk.done => {
            info!(request_id = %request_id, seq = chunk.seq, "Stream completed");
        }
        StreamEvent::Chunk(chunk) => trace!(request_id = %request_id, seq = chunk.seq, "Relaying chunk"),
        StreamEvent::Error(err) => {
            warn!(request_id = %request_id, kind = %err.kind, error = %err.message, "Stream ended with error");
        }
    }

    match stream_event_payload(event) {
        Ok(data) => Event::default().data(data),
        Err(e) => {
            error!(request_id = %request_id, error = %e, "Failed to serialize stream event");
            Event::default().data(r#"{"error":{"kind":"upstream","message":"event serialization failed"}}"#)
        }
    }
}
