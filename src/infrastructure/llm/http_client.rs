use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use serde_json::Value;
use std::pin::Pin;

use crate::domain::DomainError;

/// Raw response body, read incrementally
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, DomainError>> + Send>>;

/// Owned request headers
pub type Headers = Vec<(String, String)>;

/// Outbound HTTP seam (for mocking)
#[async_trait]
pub trait HttpClientTrait: Send + Sync + std::fmt::Debug {
    async fn post_json(&self, url: &str, headers: &Headers, body: &Value)
        -> Result<Value, DomainError>;

    /// Resolves once the status line is in; a non-2xx status is returned as an error
    async fn post_json_stream(
        &self,
        url: &str,
        headers: &Headers,
        body: &Value,
    ) -> Result<ByteStream, DomainError>;
}

/// Real HTTP client using reqwest
#[derive(Debug, Clone, Default)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn send(
        &self,
        url: &str,
        headers: &Headers,
        body: &Value,
    ) -> Result<reqwest::Response, DomainError> {
        let mut request = self.client.post(url);

        for (key, value) in headers {
            request = request.header(key.as_str(), value.as_str());
        }

        let response = request
            .json(body)
            .send()
            .await
            .map_err(|e| DomainError::upstream(None, format!("Request failed: {}", e.without_url())))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(DomainError::upstream(
                Some(status.as_u16()),
                provider_error_message(status.as_u16(), &error_body),
            ));
        }

        Ok(response)
    }
}

#[async_trait]
impl HttpClientTrait for HttpClient {
    async fn post_json(
        &self,
        url: &str,
        headers: &Headers,
        body: &Value,
    ) -> Result<Value, DomainError> {
        let response = self.send(url, headers, body).await?;

        response
            .json()
            .await
            .map_err(|e| DomainError::malformed(format!("Failed to parse response: {}", e.without_url())))
    }

    async fn post_json_stream(
        &self,
        url: &str,
        headers: &Headers,
        body: &Value,
    ) -> Result<ByteStream, DomainError> {
        let response = self.send(url, headers, body).await?;

        let stream = response.bytes_stream().map(|result| {
            result.map_err(|e| DomainError::upstream(None, format!("Stream error: {}", e.without_url())))
        });

        Ok(Box::pin(stream))
    }
}

/// Message of a provider error payload (`error.message`), or the raw body
pub fn provider_error_message(status: u16, body: &str) -> String {
    let from_json = serde_json::from_str::<Value>(body).ok().and_then(|json| {
        json.get("error")
            .and_then(|e| e.get("message").or(Some(e)))
            .and_then(|m| m.as_str())
            .map(str::to_string)
    });

    match from_json {
        Some(message) => message,
        None if body.trim().is_empty() => format!("Provider returned HTTP {}", status),
        None => body.trim().to_string(),
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use futures::stream;
    use std::collections::HashMap;
    use std::sync::{Mutex, RwLock};
    use std::time::Duration;

    /// A recorded outbound call
    #[derive(Debug, Clone)]
    pub struct RecordedCall {
        pub url: String,
        pub headers: Headers,
        pub body: Value,
    }

    #[derive(Debug, Default)]
    pub struct MockHttpClient {
        responses: RwLock<HashMap<String, Value>>,
        stream_responses: RwLock<HashMap<String, Vec<Bytes>>>,
        errors: RwLock<HashMap<String, (Option<u16>, String)>>,
        delay: Option<Duration>,
        calls: Mutex<Vec<RecordedCall>>,
    }

    impl MockHttpClient {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_response(self, url: impl Into<String>, response: Value) -> Self {
            self.responses.write().unwrap().insert(url.into(), response);
            self
        }

        pub fn with_stream_response(self, url: impl Into<String>, chunks: Vec<Bytes>) -> Self {
            self.stream_responses
                .write()
                .unwrap()
                .insert(url.into(), chunks);
            self
        }

        pub fn with_error(
            self,
            url: impl Into<String>,
            status: Option<u16>,
            error: impl Into<String>,
        ) -> Self {
            self.errors
                .write()
                .unwrap()
                .insert(url.into(), (status, error.into()));
            self
        }

        /// Delay every call before answering
        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        pub fn calls(&self) -> Vec<RecordedCall> {
            self.calls.lock().unwrap().clone()
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        async fn record(&self, url: &str, headers: &Headers, body: &Value) -> Result<(), DomainError> {
            self.calls.lock().unwrap().push(RecordedCall {
                url: url.to_string(),
                headers: headers.clone(),
                body: body.clone(),
            });

            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }

            match self.errors.read().unwrap().get(url) {
                Some((status, message)) => Err(DomainError::upstream(*status, message.clone())),
                None => Ok(()),
            }
        }
    }

    #[async_trait]
    impl HttpClientTrait for MockHttpClient {
        async fn post_json(
            &self,
            url: &str,
            headers: &Headers,
            body: &Value,
        ) -> Result<Value, DomainError> {
            self.record(url, headers, body).await?;

            self.responses
                .read()
                .unwrap()
                .get(url)
                .cloned()
                .ok_or_else(|| DomainError::upstream(None, format!("No mock response for {}", url)))
        }

        async fn post_json_stream(
            &self,
            url: &str,
            headers: &Headers,
            body: &Value,
        ) -> Result<ByteStream, DomainError> {
            self.record(url, headers, body).await?;

            let chunks = self
                .stream_responses
                .read()
                .unwrap()
                .get(url)
                .cloned()
                .unwrap_or_default();

            let stream = stream::iter(chunks.into_iter().map(Ok));
            Ok(Box::pin(stream))
        }
    }
}
