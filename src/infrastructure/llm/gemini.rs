//! Google Gemini generateContent wire mapping

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::domain::{
    ChatRequest, ChatResponse, DomainError, FinishReason, MessageRole, StreamUnit, Usage,
};

pub(super) const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub(super) const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub(super) const CREDENTIAL_NAME: &str = "GEMINI_API_KEY";
pub(super) const API_KEY_PARAM: &str = "key";

pub(super) fn endpoint(base_url: &str, model: &str, stream: bool) -> String {
    if stream {
        format!("{}/v1beta/models/{}:streamGenerateContent?alt=sse", base_url, model)
    } else {
        format!("{}/v1beta/models/{}:generateContent", base_url, model)
    }
}

/// The model is part of the URL, not the body
pub(super) fn build_body(request: &ChatRequest) -> Value {
    let contents: Vec<GeminiContent<'_>> = request
        .conversation()
        .map(|m| GeminiContent {
            role: match m.role {
                MessageRole::Assistant => "model",
                MessageRole::User | MessageRole::System => "user",
            },
            parts: vec![GeminiPart {
                text: m.content_text(),
            }],
        })
        .collect();

    let mut body = json!({ "contents": contents });

    if let Some(system) = request.system_text() {
        body["systemInstruction"] = json!({ "parts": [{ "text": system }] });
    }

    let mut generation = Map::new();

    if let Some(max_tokens) = request.max_output_tokens {
        generation.insert("maxOutputTokens".to_string(), json!(max_tokens));
    }

    if let Some(temp) = request.temperature {
        generation.insert("temperature".to_string(), json!(temp));
    }

    if let Some(ref schema) = request.response_schema {
        generation.insert("responseMimeType".to_string(), json!("application/json"));
        generation.insert("responseJsonSchema".to_string(), schema.clone());
    }

    if !generation.is_empty() {
        body["generationConfig"] = Value::Object(generation);
    }

    body
}

pub(super) fn parse_response(json: Value) -> Result<ChatResponse, DomainError> {
    let response: GeminiResponse = serde_json::from_value(json)
        .map_err(|e| DomainError::malformed(format!("Failed to parse Gemini response: {}", e)))?;

    if let Some(error) = response.error {
        return Err(DomainError::upstream(None, error.message));
    }

    let usage = response
        .usage_metadata
        .map(|u| Usage::new(u.prompt_token_count, u.candidates_token_count))
        .unwrap_or_default();

    let Some(candidate) = response.candidates.into_iter().next() else {
        // Prompt rejected before generation
        if response.prompt_feedback.and_then(|f| f.block_reason).is_some() {
            return Ok(ChatResponse::new("")
                .with_usage(usage)
                .with_finish_reason(FinishReason::ContentFiltered));
        }
        return Err(DomainError::malformed("Gemini response has no candidates"));
    };

    Ok(ChatResponse::new(candidate_text(candidate.content))
        .with_usage(usage)
        .with_finish_reason(parse_finish_reason(candidate.finish_reason.as_deref())))
}

/// Gemini has no end marker; the stream ends with the response body
pub(super) fn parse_stream_data(data: &str) -> Result<StreamUnit, DomainError> {
    let chunk: GeminiResponse = serde_json::from_str(data)
        .map_err(|e| DomainError::malformed(format!("Malformed Gemini stream chunk: {}", e)))?;

    if let Some(error) = chunk.error {
        return Err(DomainError::upstream(None, error.message));
    }

    let text = chunk
        .candidates
        .into_iter()
        .next()
        .map(|c| candidate_text(c.content))
        .unwrap_or_default();

    Ok(if text.is_empty() {
        StreamUnit::Skip
    } else {
        StreamUnit::Delta(text)
    })
}

fn candidate_text(content: Option<CandidateContent>) -> String {
    content
        .map(|c| {
            c.parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default()
}

fn parse_finish_reason(reason: Option<&str>) -> FinishReason {
    match reason {
        None | Some("STOP") | Some("FINISH_REASON_UNSPECIFIED") => FinishReason::Completed,
        Some("MAX_TOKENS") => FinishReason::LengthTruncated,
        Some("SAFETY") | Some("RECITATION") | Some("BLOCKLIST") | Some("PROHIBITED_CONTENT")
        | Some("SPII") => FinishReason::ContentFiltered,
        Some(_) => FinishReason::Error,
    }
}

// Gemini API types

#[derive(Debug, Serialize)]
struct GeminiContent<'a> {
    role: &'static str,
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Debug, Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
    prompt_feedback: Option<PromptFeedback>,
    error: Option<GeminiError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
}
