//! OpenAI chat completions wire mapping

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::domain::{ChatRequest, ChatResponse, DomainError, FinishReason, StreamUnit, Usage};

pub(super) const DEFAULT_BASE_URL: &str = "https://api.openai.com";
pub(super) const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub(super) const CREDENTIAL_NAME: &str = "OPENAI_API_KEY";

const STREAM_DONE: &str = "[DONE]";

pub(super) fn endpoint(base_url: &str) -> String {
    format!("{}/v1/chat/completions", base_url)
}

pub(super) fn build_body(request: &ChatRequest, model: &str, stream: bool) -> Value {
    let system = request.system_text();

    let messages: Vec<OpenAiMessage<'_>> = system
        .as_deref()
        .map(|content| OpenAiMessage {
            role: "system",
            content,
        })
        .into_iter()
        .chain(request.conversation().map(|m| OpenAiMessage {
            role: m.role.as_str(),
            content: m.content_text(),
        }))
        .collect();

    let mut body = json!({
        "model": model,
        "messages": messages,
    });

    if stream {
        body["stream"] = json!(true);
    }

    if let Some(temp) = request.temperature {
        body["temperature"] = json!(temp);
    }

    if let Some(max_tokens) = request.max_output_tokens {
        body["max_completion_tokens"] = json!(max_tokens);
    }

    if let Some(ref schema) = request.response_schema {
        body["response_format"] = json!({
            "type": "json_schema",
            "json_schema": {
                "name": "response",
                "schema": schema,
            }
        });
    }

    body
}

pub(super) fn parse_response(json: Value) -> Result<ChatResponse, DomainError> {
    let response: OpenAiResponse = serde_json::from_value(json)
        .map_err(|e| DomainError::malformed(format!("Failed to parse OpenAI response: {}", e)))?;

    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| DomainError::malformed("OpenAI response has no choices"))?;

    let text = choice
        .message
        .and_then(|m| m.content)
        .map(|content| content_text(&content))
        .unwrap_or_default();

    let usage = response
        .usage
        .map(|u| Usage::new(u.prompt_tokens, u.completion_tokens))
        .unwrap_or_default();

    Ok(ChatResponse::new(text)
        .with_usage(usage)
        .with_finish_reason(parse_finish_reason(choice.finish_reason.as_deref())))
}

pub(super) fn parse_stream_data(data: &str) -> Result<StreamUnit, DomainError> {
    if data.trim() == STREAM_DONE {
        return Ok(StreamUnit::Done);
    }

    let chunk: OpenAiStreamChunk = serde_json::from_str(data)
        .map_err(|e| DomainError::malformed(format!("Malformed OpenAI stream chunk: {}", e)))?;

    if let Some(error) = chunk.error {
        return Err(DomainError::upstream(None, error.message));
    }

    let delta = chunk
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.delta)
        .and_then(|d| d.content);

    Ok(match delta {
        Some(text) if !text.is_empty() => StreamUnit::Delta(text),
        _ => StreamUnit::Skip,
    })
}

fn parse_finish_reason(reason: Option<&str>) -> FinishReason {
    match reason {
        Some("length") => FinishReason::LengthTruncated,
        Some("content_filter") => FinishReason::ContentFiltered,
        _ => FinishReason::Completed,
    }
}

/// Message content is either a string or a list of text parts
fn content_text(content: &Value) -> String {
    match content {
        Value::String(text) => text.trim().to_string(),
        Value::Array(parts) => parts
            .iter()
            .filter_map(|part| match part {
                Value::String(text) => Some(text.as_str()),
                _ => part.get("text").and_then(Value::as_str),
            })
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
            .trim()
            .to_string(),
        _ => String::new(),
    }
}

// OpenAI API types

#[derive(Debug, Serialize)]
struct OpenAiMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<OpenAiUsage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct OpenAiStreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    error: Option<OpenAiError>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    delta: Option<StreamDelta>,
}

#[derive(Debug, Deserialize)]
struct StreamDelta {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiError {
    message: String,
}
