//! Cross-origin policy: preflight answers and response headers

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, HeaderValue, Method, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::config::CorsConfig;

pub const ALLOWED_METHODS: &str = "POST, OPTIONS";
pub const ALLOWED_HEADERS: &str = "Content-Type, Authorization";

/// Answer OPTIONS on any path with 204 and add the CORS headers to other
/// responses whose origin is allowed.
pub async fn cors_middleware(
    State(cors): State<Arc<CorsConfig>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let allow_origin = allowed_origin(&cors, request.headers());

    if request.method() == Method::OPTIONS {
        debug!(
            path = %request.uri().path(),
            allowed = allow_origin.is_some(),
            "Answering preflight"
        );
        let mut response = StatusCode::NO_CONTENT.into_response();
        apply_cors_headers(response.headers_mut(), allow_origin);
        return response;
    }

    let mut response = next.run(request).await;
    if allow_origin.is_some() {
        apply_cors_headers(response.headers_mut(), allow_origin);
    }
    response
}

/// Allow-Origin value for a request: `*` when no origins are configured,
/// otherwise the request origin if it matches one exactly or by prefix.
fn allowed_origin(cors: &CorsConfig, headers: &HeaderMap) -> Option<HeaderValue> {
    let configured: Vec<&str> = cors
        .allowed_origins
        .iter()
        .map(|o| o.trim())
        .filter(|o| !o.is_empty())
        .collect();

    if configured.is_empty() {
        return Some(HeaderValue::from_static("*"));
    }

    let origin = headers.get(header::ORIGIN)?;
    let origin_str = origin.to_str().ok()?;

    configured
        .iter()
        .any(|allowed| origin_str == *allowed || origin_str.starts_with(allowed))
        .then(|| origin.clone())
}

fn apply_cors_headers(headers: &mut HeaderMap, allow_origin: Option<HeaderValue>) {
    if let Some(origin) = allow_origin {
        if origin != "*" {
            headers.insert(header::VARY, HeaderValue::from_static("Origin"));
        }
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin);
    }
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOWED_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOWED_HEADERS),
    );
}
