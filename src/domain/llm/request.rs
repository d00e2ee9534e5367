use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Message, MessageRole};
use crate::domain::DomainError;

// Model names end up in provider URL paths
static MODEL_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9._:\-]+$").unwrap());

/// Instruction appended to the prompt when a provider cannot enforce a schema natively
const SCHEMA_INSTRUCTION_PREFIX: &str =
    "Respond with ONLY a JSON value (no markdown fences, no commentary) that conforms to this JSON Schema:";

/// Provider-agnostic chat request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<Value>,
}

impl ChatRequest {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            model: None,
            system: None,
            temperature: None,
            max_output_tokens: None,
            response_schema: None,
        }
    }

    pub fn builder() -> ChatRequestBuilder {
        ChatRequestBuilder::new()
    }

    /// Check the request against the normalized contract
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.messages.is_empty() {
            return Err(DomainError::validation("messages cannot be empty"));
        }

        if let Some(index) = self.messages.iter().position(|m| m.content.trim().is_empty()) {
            return Err(DomainError::validation(format!(
                "messages[{}].content cannot be empty",
                index
            )));
        }

        if let Some(temp) = self.temperature {
            if !(0.0..=2.0).contains(&temp) {
                return Err(DomainError::validation("temperature must be between 0 and 2"));
            }
        }

        if self.max_output_tokens == Some(0) {
            return Err(DomainError::validation("maxOutputTokens must be greater than 0"));
        }

        if let Some(model) = self.model.as_deref().filter(|m| !m.trim().is_empty()) {
            if !MODEL_NAME.is_match(model) {
                return Err(DomainError::validation(
                    "model may only contain letters, digits, '.', '_', ':' and '-'",
                ));
            }
        }

        if let Some(schema) = &self.response_schema {
            if !schema.is_object() {
                return Err(DomainError::validation("responseSchema must be a JSON object"));
            }
        }

        Ok(())
    }

    /// System instruction combined from the explicit field and any system-role messages
    pub fn system_text(&self) -> Option<String> {
        let parts: Vec<&str> = self
            .system
            .as_deref()
            .into_iter()
            .chain(
                self.messages
                    .iter()
                    .filter(|m| m.is_system())
                    .map(|m| m.content_text()),
            )
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join("\n"))
        }
    }

    /// Messages other than system-role messages, in order
    pub fn conversation(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter().filter(|m| !m.is_system())
    }

    /// Move the response schema into the prompt as its last instruction.
    ///
    /// Used for providers without native structured output. The schema field is
    /// cleared so the provider body never carries it.
    pub fn with_schema_instruction(mut self) -> Self {
        let Some(schema) = self.response_schema.take() else {
            return self;
        };

        let rendered = serde_json::to_string_pretty(&schema).unwrap_or_else(|_| schema.to_string());
        let instruction = format!("{}\n{}", SCHEMA_INSTRUCTION_PREFIX, rendered);

        match self.messages.last_mut() {
            Some(last) if last.role == MessageRole::User => {
                last.content.push_str("\n\n");
                last.content.push_str(&instruction);
            }
            _ => self.messages.push(Message::user(instruction)),
        }

        self
    }
}

/// Builder for ChatRequest
#[derive(Debug, Default)]
pub struct ChatRequestBuilder {
    messages: Vec<Message>,
    model: Option<String>,
    system: Option<String>,
    temperature: Option<f32>,
    max_output_tokens: Option<u32>,
    response_schema: Option<Value>,
}

impl ChatRequestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    pub fn messages(mut self, messages: Vec<Message>) -> Self {
        self.messages = messages;
        self
    }

    pub fn user(self, content: impl Into<String>) -> Self {
        self.message(Message::user(content))
    }

    pub fn assistant(self, content: impl Into<String>) -> Self {
        self.message(Message::assistant(content))
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn system(mut self, content: impl Into<String>) -> Self {
        self.system = Some(content.into());
        self
    }

    pub fn temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }

    pub fn max_output_tokens(mut self, tokens: u32) -> Self {
        self.max_output_tokens = Some(tokens);
        self
    }

    pub fn response_schema(mut self, schema: Value) -> Self {
        self.response_schema = Some(schema);
        self
    }

    pub fn build(self) -> ChatRequest {
        ChatRequest {
            messages: self.messages,
            model: self.model,
            system: self.system,
            temperature: self.temperature,
            max_output_tokens: self.max_output_tokens,
            response_schema: self.response_schema,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_builder() {
        let request = ChatRequest::builder()
            .system("You are a helpful assistant")
            .user("Hello!")
            .temperature(0.7)
            .max_output_tokens(100)
            .build();

        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.temperature, Some(0.7));
        assert_eq!(request.max_output_tokens, Some(100));
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_messages() {
        let request = ChatRequest::new(vec![]);
        assert!(matches!(request.validate(), Err(DomainError::Validation { .. })));
    }

    #[test]
    fn test_validate_rejects_blank_content() {
        let request = ChatRequest::builder().user("hi").user("   ").build();
        let err = request.validate().unwrap_err();
        assert!(err.to_string().contains("messages[1]"));
    }

    #[test]
    fn test_validate_rejects_out_of_range_values() {
        let request = ChatRequest::builder().user("hi").temperature(2.5).build();
        assert!(request.validate().is_err());

        let request = ChatRequest::builder().user("hi").max_output_tokens(0).build();
        assert!(request.validate().is_err());

        let request = ChatRequest::builder()
            .user("hi")
            .response_schema(json!("not-a-schema"))
            .build();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_validate_model_name() {
        for model in ["gpt-4o-mini", "gemini-2.5-flash", "ft:gpt-4o:acme:v1", "claude-3.5"] {
            let request = ChatRequest::builder().user("hi").model(model).build();
            assert!(request.validate().is_ok(), "{} should be accepted", model);
        }

        for model in ["../other", "gemini?alt=json", "x#frag", "a/b", "has space"] {
            let request = ChatRequest::builder().user("hi").model(model).build();
            assert!(request.validate().is_err(), "{} should be rejected", model);
        }
    }

    #[test]
    fn test_system_text_merges_field_and_messages() {
        let request = ChatRequest::builder()
            .system("Be terse")
            .message(Message::system("Answer in English"))
            .user("Hello")
            .build();

        assert_eq!(request.system_text().as_deref(), Some("Be terse\nAnswer in English"));
        assert_eq!(request.conversation().count(), 1);
    }

    #[test]
    fn test_schema_instruction_appends_to_last_user_message() {
        let schema = json!({"type": "object", "properties": {"a": {"type": "number"}}});
        let request = ChatRequest::builder()
            .user("Extract the value")
            .response_schema(schema)
            .build()
            .with_schema_instruction();

        assert!(request.response_schema.is_none());
        assert_eq!(request.messages.len(), 1);
        let content = request.messages[0].content_text();
        assert!(content.starts_with("Extract the value"));
        assert!(content.contains(SCHEMA_INSTRUCTION_PREFIX));
        assert!(content.ends_with('}'));
    }

    #[test]
    fn test_schema_instruction_adds_user_message_after_assistant() {
        let request = ChatRequest::builder()
            .user("Hi")
            .assistant("Hello")
            .response_schema(json!({"type": "object"}))
            .build()
            .with_schema_instruction();

        assert_eq!(request.messages.len(), 3);
        assert_eq!(request.messages[2].role, MessageRole::User);
    }

    #[test]
    fn test_schema_instruction_without_schema_is_noop() {
        let request = ChatRequest::builder().user("Hi").build().with_schema_instruction();
        assert_eq!(request.messages[0].content_text(), "Hi");
    }
}
