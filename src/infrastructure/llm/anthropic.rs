//! Anthropic messages API wire mapping

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::domain::{
    ChatRequest, ChatResponse, DomainError, FinishReason, MessageRole, StreamUnit, Usage,
};

pub(super) const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
pub(super) const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
pub(super) const CREDENTIAL_NAME: &str = "ANTHROPIC_API_KEY";
pub(super) const API_KEY_HEADER: &str = "x-api-key";

const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u32 = 4096;

pub(super) fn endpoint(base_url: &str) -> String {
    format!("{}/v1/messages", base_url)
}

pub(super) fn extra_headers() -> [(&'static str, &'static str); 1] {
    [("anthropic-version", ANTHROPIC_VERSION)]
}

/// The schema, if any, has already been moved into the prompt
pub(super) fn build_body(request: &ChatRequest, model: &str, stream: bool) -> Value {
    let messages: Vec<AnthropicMessage<'_>> = request
        .conversation()
        .map(|m| AnthropicMessage {
            role: match m.role {
                MessageRole::Assistant => "assistant",
                MessageRole::User | MessageRole::System => "user",
            },
            content: m.content_text(),
        })
        .collect();

    let mut body = json!({
        "model": model,
        "messages": messages,
        "max_tokens": request.max_output_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
    });

    if stream {
        body["stream"] = json!(true);
    }

    if let Some(system) = request.system_text() {
        body["system"] = json!(system);
    }

    if let Some(temp) = request.temperature {
        body["temperature"] = json!(temp);
    }

    body
}

pub(super) fn parse_response(json: Value) -> Result<ChatResponse, DomainError> {
    let response: AnthropicResponse = serde_json::from_value(json).map_err(|e| {
        DomainError::malformed(format!("Failed to parse Anthropic response: {}", e))
    })?;

    if let Some(error) = response.error {
        return Err(DomainError::upstream(None, error.message));
    }

    let text = response
        .content
        .into_iter()
        .filter(|block| block.content_type == "text")
        .filter_map(|block| block.text)
        .collect::<Vec<_>>()
        .join("");

    let usage = response
        .usage
        .map(|u| Usage::new(u.input_tokens, u.output_tokens))
        .unwrap_or_default();

    Ok(ChatResponse::new(text)
        .with_usage(usage)
        .with_finish_reason(parse_stop_reason(response.stop_reason.as_deref())))
}

pub(super) fn parse_stream_data(data: &str) -> Result<StreamUnit, DomainError> {
    let event: AnthropicStreamEvent = serde_json::from_str(data)
        .map_err(|e| DomainError::malformed(format!("Malformed Anthropic stream event: {}", e)))?;

    match event.event_type.as_str() {
        "content_block_delta" => Ok(event
            .delta
            .filter(|d| d.delta_type == "text_delta")
            .and_then(|d| d.text)
            .filter(|text| !text.is_empty())
            .map_or(StreamUnit::Skip, StreamUnit::Delta)),
        "message_stop" => Ok(StreamUnit::Done),
        "error" => {
            let message = event
                .error
                .map(|e| e.message)
                .unwrap_or_else(|| "Anthropic stream failed".to_string());
            Err(DomainError::upstream(None, message))
        }
        _ => Ok(StreamUnit::Skip),
    }
}

fn parse_stop_reason(reason: Option<&str>) -> FinishReason {
    match reason {
        Some("max_tokens") => FinishReason::LengthTruncated,
        Some("refusal") => FinishReason::ContentFiltered,
        _ => FinishReason::Completed,
    }
}

// Anthropic API types

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    stop_reason: Option<String>,
    usage: Option<AnthropicUsage>,
    error: Option<AnthropicError>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    content_type: String,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AnthropicUsage {
    #[serde(default)]
    input_tokens: u32,
    #[serde(default)]
    output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct AnthropicStreamEvent {
    #[serde(rename = "type")]
    event_type: String,
    delta: Option<StreamDelta>,
    error: Option<AnthropicError>,
}

#[derive(Debug, Deserialize)]
struct StreamDelta {
    #[serde(rename = "type", default)]
    delta_type: String,
    text: Option<String>,
}
