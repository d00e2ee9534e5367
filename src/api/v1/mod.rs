//! Gateway v1 API endpoints

pub mod chat;
pub mod extract;
pub mod providers;
pub mod stream;

use axum::{
    routing::{get, post},
    Router,
};

use super::state::AppState;

/// Create v1 API router
pub fn create_v1_router() -> Router<AppState> {
    Router::new()
        .route("/providers", get(providers::list_providers))
        .route("/{provider}/chat", post(chat::chat))
        .route("/{provider}/chat/stream", post(stream::chat_stream))
        .route("/{provider}/extract", post(extract::extract))
}
