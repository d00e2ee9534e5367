//! Wire types for the chat endpoints

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{ChatRequest, Message, MessageRole, StreamChunk, StreamError, StreamEvent};

/// One message as sent by the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessageBody {
    pub role: MessageRole,
    pub content: String,
}

impl From<ChatMessageBody> for Message {
    fn from(message: ChatMessageBody) -> Self {
        Message::new(message.role, message.content)
    }
}

/// Body of `POST /v1/{provider}/chat` and `/chat/stream`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequestBody {
    pub messages: Vec<ChatMessageBody>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
}

impl From<ChatRequestBody> for ChatRequest {
    fn from(body: ChatRequestBody) -> Self {
        ChatRequest {
            messages: body.messages.into_iter().map(Message::from).collect(),
            model: body.model.filter(|m| !m.trim().is_empty()),
            system: body.system,
            temperature: body.temperature,
            max_output_tokens: body.max_output_tokens,
            response_schema: body.response_schema,
        }
    }
}

/// Terminal error payload of a stream: `{"error": {"kind", "message"}}`
#[derive(Debug, Clone, Serialize)]
pub struct StreamErrorBody {
    pub error: StreamError,
}

/// JSON payload of one server-sent event
pub fn stream_event_payload(event: &StreamEvent) -> Result<String, serde_json::Error> {
    match event {
        StreamEvent::Chunk(chunk) => serde_json::to_string::<StreamChunk>(chunk),
        StreamEvent::Error(error) => serde_json::to_string(&StreamErrorBody {
            error: error.clone(),
        }),
    }
}
