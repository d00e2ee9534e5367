//! Authorization header presence check

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::ApiError;

/// Extractor that requires a non-empty `Authorization` header.
///
/// The token itself is not validated here. When `gateway.require_auth_header`
/// is off the extractor always succeeds with `None`.
#[derive(Debug, Clone)]
pub struct RequireAuthorization(pub Option<String>);

impl FromRequestParts<AppState> for RequireAuthorization {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if !state.gateway.require_auth_header {
            return Ok(RequireAuthorization(None));
        }

        let value = extract_authorization(&parts.headers)?;
        debug!(scheme = %value.split_whitespace().next().unwrap_or(""), "Authorization header present");

        Ok(RequireAuthorization(Some(value)))
    }
}

fn extract_authorization(headers: &HeaderMap) -> Result<String, ApiError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| ApiError::unauthorized("Authorization header required"))?
        .to_str()
        .map_err(|_| ApiError::bad_request("Invalid Authorization header encoding"))?
        .trim();

    if value.is_empty() {
        return Err(ApiError::unauthorized("Authorization header cannot be empty"));
    }

    Ok(value.to_string())
}
