//! Extraction service: compose action schemas, call a provider, recover validated actions

use std::sync::Arc;

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{info, instrument, warn};

use super::ChatServiceTrait;
use crate::domain::extraction::{discourse, DEFAULT_ENVELOPE_FIELD};
use crate::domain::{
    compose, ActionDescriptor, ChatRequest, ChatResponse, ComposeError, DomainError,
    ExtractionError, ExtractionParser, MessageRole, NodeType,
};

/// Failure of an extraction task, by the stage that failed
#[derive(Debug, Error)]
pub enum ExtractionServiceError {
    #[error(transparent)]
    Compose(#[from] ComposeError),

    #[error(transparent)]
    Gateway(#[from] DomainError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),
}

/// One extraction task
#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    pub chat: ChatRequest,
    pub actions: Vec<ActionDescriptor>,
    /// Property holding the action sequence in the model output
    pub field: Option<String>,
    /// Optional properties the model may return next to the sequence
    pub metadata: Map<String, Value>,
}

impl ExtractionRequest {
    pub fn new(chat: ChatRequest, actions: Vec<ActionDescriptor>) -> Self {
        Self {
            chat,
            actions,
            field: None,
            metadata: Map::new(),
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = metadata;
        self
    }

    /// Discourse-node extraction using the built-in action pack.
    ///
    /// User text is normalized and the last user message is framed with the
    /// requested types and the optional research question.
    pub fn discourse(
        chat: ChatRequest,
        node_types: &[NodeType],
        research_question: Option<&str>,
    ) -> Self {
        let mut chat = chat;
        let instruction = discourse::discourse_instruction(node_types);
        chat.system = Some(match chat.system.take() {
            Some(existing) => format!("{}\n\n{}", existing, instruction),
            None => instruction,
        });

        for message in chat.messages.iter_mut().filter(|m| m.role == MessageRole::User) {
            message.content = discourse::normalize_source_text(&message.content);
        }

        if let Some(last) = chat
            .messages
            .iter_mut()
            .rev()
            .find(|m| m.role == MessageRole::User && !m.content.is_empty())
        {
            last.content = discourse::discourse_prompt(&last.content, node_types, research_question);
        }

        let actions = discourse::discourse_registry(node_types).actions().to_vec();
        Self::new(chat, actions)
            .with_field(discourse::NODES_FIELD)
            .with_metadata(discourse::metadata_properties())
    }

    fn field(&self) -> &str {
        self.field
            .as_deref()
            .filter(|f| !f.trim().is_empty())
            .unwrap_or(DEFAULT_ENVELOPE_FIELD)
    }
}

/// Validated actions plus the model text they were recovered from
#[derive(Debug, Clone)]
pub struct ExtractionOutcome {
    pub actions: Vec<Value>,
    /// Requested optional properties present in the output
    pub metadata: Map<String, Value>,
    pub raw: String,
    pub response: ChatResponse,
}

/// Extraction service implementation
#[derive(Debug, Clone)]
pub struct ExtractionService {
    chat: Arc<dyn ChatServiceTrait>,
}

impl ExtractionService {
    pub fn new(chat: Arc<dyn ChatServiceTrait>) -> Self {
        Self { chat }
    }

    /// Schema composition and compilation happen before the provider is called
    #[instrument(skip(self, request), fields(provider = %provider, actions = request.actions.len()))]
    pub async fn extract(
        &self,
        provider: &str,
        request: ExtractionRequest,
    ) -> Result<ExtractionOutcome, ExtractionServiceError> {
        let field = request.field().to_string();
        let union = compose(&request.actions)?;
        let schema = union.enveloped_with(&field, &request.metadata);
        let parser = ExtractionParser::new(&schema)?;

        let mut chat = request.chat;
        chat.response_schema = Some(schema);

        let response = self.chat.complete(provider, chat).await?;

        let result = parser.extract(&response.text).map_err(|e| {
            warn!(code = e.code(), "Model output did not yield valid actions");
            e
        })?;

        let mut output = match result.into_value() {
            Value::Object(map) => map,
            _ => Map::new(),
        };

        let actions = match output.remove(&field) {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        };

        output.retain(|key, _| request.metadata.contains_key(key));

        info!(extracted = actions.len(), metadata = output.len(), "Extraction completed");

        Ok(ExtractionOutcome {
            actions,
            metadata: output,
            raw: response.text.clone(),
            response,
        })
    }
}
