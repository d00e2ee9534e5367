//! Wire types for the extraction endpoint

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::chat::ChatMessageBody;
use crate::domain::extraction::discourse::{AUTHORS_FIELD, TITLE_FIELD};
use crate::domain::{ActionDescriptor, ChatRequest, Message, NodeType};
use crate::infrastructure::services::{ExtractionOutcome, ExtractionRequest};

/// Body of `POST /v1/{provider}/extract`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractRequestBody {
    pub messages: Vec<ChatMessageBody>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub max_output_tokens: Option<u32>,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub system: Option<String>,
    #[serde(default)]
    pub actions: Vec<ActionDescriptor>,
    /// Property holding the action list in the model output
    #[serde(default)]
    pub field: Option<String>,
    /// Discourse node codes; when present the built-in node pack replaces `actions`
    #[serde(default)]
    pub node_types: Option<Vec<NodeType>>,
    /// Focus question for discourse extraction
    #[serde(default)]
    pub research_question: Option<String>,
}

impl From<ExtractRequestBody> for ExtractionRequest {
    fn from(body: ExtractRequestBody) -> Self {
        let chat = ChatRequest {
            messages: body.messages.into_iter().map(Message::from).collect(),
            model: body.model.filter(|m| !m.trim().is_empty()),
            system: body.system,
            temperature: body.temperature,
            max_output_tokens: body.max_output_tokens,
            response_schema: None,
        };

        match body.node_types {
            Some(types) if !types.is_empty() => {
                ExtractionRequest::discourse(chat, &types, body.research_question.as_deref())
            }
            _ => {
                let request = ExtractionRequest::new(chat, body.actions);
                match body.field {
                    Some(field) => request.with_field(field),
                    None => request,
                }
            }
        }
    }
}

/// Validated actions and the raw model text, plus document metadata for discourse extraction
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractResponseBody {
    pub actions: Vec<Value>,
    pub raw: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paper_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paper_authors: Option<Vec<String>>,
}

impl From<ExtractionOutcome> for ExtractResponseBody {
    fn from(outcome: ExtractionOutcome) -> Self {
        let paper_title = outcome
            .metadata
            .get(TITLE_FIELD)
            .and_then(Value::as_str)
            .map(str::to_string);
        let paper_authors = outcome.metadata.get(AUTHORS_FIELD).and_then(Value::as_array).map(|authors| {
            authors
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        });

        Self {
            actions: outcome.actions,
            raw: outcome.raw,
            paper_title,
            paper_authors,
        }
    }
}
