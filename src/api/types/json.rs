//! JSON extractor whose rejections come back as bad-request envelopes

use axum::{
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json as AxumJson,
};
use serde::de::DeserializeOwned;

use super::error::ApiError;

/// Wrapper around `axum::Json` that reports body errors in the API error format
#[derive(Debug, Clone, Copy, Default)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    /// Consume the extractor and return the inner value
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> std::ops::Deref for Json<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Body rejection, always of kind bad-request
#[derive(Debug)]
pub struct JsonRejection {
    status: StatusCode,
    message: String,
}

impl IntoResponse for JsonRejection {
    fn into_response(self) -> Response {
        let mut error = ApiError::bad_request(self.message).with_code("invalid-body");
        error.status = self.status;
        error.into_response()
    }
}

impl<S, T> FromRequest<S> for Json<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = JsonRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match AxumJson::<T>::from_request(req, state).await {
            Ok(AxumJson(value)) => Ok(Json(value)),
            Err(rejection) => Err(rejection_to_error(&rejection)),
        }
    }
}

fn rejection_to_error(rejection: &axum::extract::rejection::JsonRejection) -> JsonRejection {
    use axum::extract::rejection::JsonRejection::*;

    let (status, message) = match rejection {
        JsonDataError(err) => (
            StatusCode::BAD_REQUEST,
            format!("Invalid request body: {}", err.body_text()),
        ),
        JsonSyntaxError(err) => (
            StatusCode::BAD_REQUEST,
            format!("Invalid JSON syntax: {}", err.body_text()),
        ),
        MissingJsonContentType(_) => (
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "Missing Content-Type header. Expected 'application/json'.".to_string(),
        ),
        BytesRejection(err) => (
            StatusCode::BAD_REQUEST,
            format!("Failed to read request body: {}", err.body_text()),
        ),
        _ => (StatusCode::BAD_REQUEST, "Invalid JSON request".to_string()),
    };

    JsonRejection { status, message }
}

impl<T> IntoResponse for Json<T>
where
    T: serde::Serialize,
{
    fn into_response(self) -> Response {
        AxumJson(self.0).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Named {
        name: String,
    }

    async fn extract(body: &'static str, content_type: Option<&str>) -> Result<Json<Named>, Response> {
        let mut builder = Request::builder().method("POST").uri("/");
        if let Some(content_type) = content_type {
            builder = builder.header("content-type", content_type);
        }
        let req = builder.body(Body::from(body)).unwrap();

        Json::<Named>::from_request(req, &())
            .await
            .map_err(IntoResponse::into_response)
    }

    #[tokio::test]
    async fn test_valid_body() {
        let json = extract(r#"{"name": "x"}"#, Some("application/json")).await.unwrap();
        assert_eq!(json.into_inner().name, "x");
    }

    #[tokio::test]
    async fn test_missing_field_is_bad_request() {
        let response = extract(r#"{"other": 1}"#, Some("application/json")).await.unwrap_err();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["kind"], "bad-request");
        assert!(json["error"]["message"].as_str().unwrap().contains("name"));
    }

    #[tokio::test]
    async fn test_syntax_error_is_bad_request() {
        let response = extract("{not json", Some("application/json")).await.unwrap_err();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_missing_content_type() {
        let response = extract(r#"{"name": "x"}"#, None).await.unwrap_err();
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }
}
