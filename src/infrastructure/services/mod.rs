//! Infrastructure services

mod chat_service;
mod extraction_service;

pub use chat_service::{ChatService, ChatServiceConfig, ChatServiceTrait};
pub use extraction_service::{
    ExtractionOutcome, ExtractionRequest, ExtractionService, ExtractionServiceError,
};

#[cfg(test)]
pub use chat_service::MockChatServiceTrait;
