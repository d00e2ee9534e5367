//! Normalized error envelope: `{"error": {"kind", "message", "code"?}}`

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, ErrorKind, ExtractionError};
use crate::infrastructure::services::ExtractionServiceError;

/// Error response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

/// Error detail structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub kind: ErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// API error with status code
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub response: ApiErrorResponse,
}

impl ApiError {
    pub fn new(status: StatusCode, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            status,
            response: ApiErrorResponse {
                error: ApiErrorDetail {
                    kind,
                    message: message.into(),
                    code: None,
                },
            },
        }
    }

    /// Add error code
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.response.error.code = Some(code.into());
        self
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, ErrorKind::BadRequest, message)
    }

    /// Missing or unusable Authorization header
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, ErrorKind::BadRequest, message)
    }

    pub fn method_not_allowed(message: impl Into<String>) -> Self {
        Self::new(StatusCode::METHOD_NOT_ALLOWED, ErrorKind::BadRequest, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, ErrorKind::BadRequest, message)
    }

    pub fn configuration(status: StatusCode, message: impl Into<String>) -> Self {
        Self::new(status, ErrorKind::Configuration, message)
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, ErrorKind::Upstream, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(StatusCode::GATEWAY_TIMEOUT, ErrorKind::Timeout, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorKind::Upstream,
            message,
        )
    }

    pub fn kind(&self) -> ErrorKind {
        self.response.error.kind
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.response)).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        let message = err.to_string();

        match &err {
            DomainError::Validation { message } => Self::bad_request(message),
            DomainError::ProviderNotFound { .. } => {
                Self::configuration(StatusCode::NOT_FOUND, message)
            }
            DomainError::Credential { .. } | DomainError::Configuration { .. } => {
                Self::configuration(StatusCode::INTERNAL_SERVER_ERROR, message)
            }
            DomainError::Upstream {
                status: Some(status),
                message: provider_message,
            } if (400..500).contains(status) => Self::new(
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_REQUEST),
                ErrorKind::BadRequest,
                provider_message,
            ),
            DomainError::Upstream { .. } => Self::upstream(message),
            DomainError::Timeout { .. } => Self::timeout(message),
            DomainError::Internal { .. } => Self::internal(message),
        }
    }
}

impl From<ExtractionServiceError> for ApiError {
    fn from(err: ExtractionServiceError) -> Self {
        match err {
            ExtractionServiceError::Compose(e) => {
                Self::configuration(StatusCode::UNPROCESSABLE_ENTITY, e.to_string()).with_code(e.code())
            }
            ExtractionServiceError::Gateway(e) => e.into(),
            ExtractionServiceError::Extraction(e @ ExtractionError::InvalidSchema { .. }) => {
                Self::bad_request(e.to_string()).with_code(e.code())
            }
            ExtractionServiceError::Extraction(e) => {
                Self::upstream(e.to_string()).with_code(e.code())
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}",
            self.response.error.kind, self.response.error.message
        )
    }
}

impl std::error::Error for ApiError {}
