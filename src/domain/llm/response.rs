use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, ErrorKind};

/// Reason why the generation finished
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FinishReason {
    Completed,
    LengthTruncated,
    ContentFiltered,
    Error,
}

/// Token usage statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl Usage {
    pub fn new(input_tokens: u32, output_tokens: u32) -> Self {
        Self {
            input_tokens,
            output_tokens,
        }
    }

    pub fn total(&self) -> u32 {
        self.input_tokens.saturating_add(self.output_tokens)
    }
}

/// Provider-agnostic reply to a non-streaming call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub text: String,
    pub usage: Usage,
    pub finish_reason: FinishReason,
}

impl ChatResponse {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            usage: Usage::default(),
            finish_reason: FinishReason::Completed,
        }
    }

    pub fn with_usage(mut self, usage: Usage) -> Self {
        self.usage = usage;
        self
    }

    pub fn with_finish_reason(mut self, reason: FinishReason) -> Self {
        self.finish_reason = reason;
        self
    }
}

/// One decoded unit of a provider stream, before sequencing
#[derive(Debug, Clone, PartialEq)]
pub enum StreamUnit {
    /// Text to forward to the caller
    Delta(String),
    /// Provider signalled the end of the stream
    Done,
    /// Keep-alive or metadata event with nothing to forward
    Skip,
}

/// Sequenced chunk delivered to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamChunk {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub delta: String,
    pub seq: u64,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub done: bool,
}

impl StreamChunk {
    pub fn delta(seq: u64, delta: impl Into<String>) -> Self {
        Self {
            delta: delta.into(),
            seq,
            done: false,
        }
    }

    pub fn terminal(seq: u64) -> Self {
        Self {
            delta: String::new(),
            seq,
            done: true,
        }
    }
}

/// Error body carried by a terminal error event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamError {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&DomainError> for StreamError {
    fn from(error: &DomainError) -> Self {
        Self {
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

/// Event delivered on a live stream: a chunk, or the terminal error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    Chunk(StreamChunk),
    Error(StreamError),
}

impl StreamEvent {
    /// Whether no further event follows this one
    pub fn is_terminal(&self) -> bool {
        match self {
            Self::Chunk(chunk) => chunk.done,
            Self::Error(_) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_total() {
        let usage = Usage::new(10, 20);
        assert_eq!(usage.total(), 30);

        let usage = Usage::new(u32::MAX, 5);
        assert_eq!(usage.total(), u32::MAX);
    }

    #[test]
    fn test_response_serialization_uses_wire_names() {
        let response = ChatResponse::new("Hello!")
            .with_usage(Usage::new(3, 4))
            .with_finish_reason(FinishReason::LengthTruncated);

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["text"], "Hello!");
        assert_eq!(json["usage"]["inputTokens"], 3);
        assert_eq!(json["usage"]["outputTokens"], 4);
        assert_eq!(json["finishReason"], "length-truncated");
    }

    #[test]
    fn test_chunk_serialization() {
        let chunk = serde_json::to_value(StreamChunk::delta(2, "Hi")).unwrap();
        assert_eq!(chunk, serde_json::json!({"delta": "Hi", "seq": 2}));

        let terminal = serde_json::to_value(StreamChunk::terminal(3)).unwrap();
        assert_eq!(terminal, serde_json::json!({"seq": 3, "done": true}));
    }

    #[test]
    fn test_terminal_events() {
        assert!(!StreamEvent::Chunk(StreamChunk::delta(0, "a")).is_terminal());
        assert!(StreamEvent::Chunk(StreamChunk::terminal(1)).is_terminal());
        assert!(StreamEvent::Error(StreamError {
            kind: ErrorKind::Upstream,
            message: "reset".to_string(),
        })
        .is_terminal());
    }
}
