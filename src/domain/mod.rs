//! Domain layer - provider-neutral chat model, credentials and structured extraction

pub mod credentials;
pub mod error;
pub mod extraction;
pub mod llm;

pub use credentials::{Credential, CredentialProvider};
pub use error::{DomainError, ErrorKind};
pub use extraction::{
    compose, extract, ActionDescriptor, ActionRegistry, ComposeError, ExtractionError,
    ExtractionParser, ExtractionResult, NodeType, UnionSchema,
};
pub use llm::{
    AuthScheme, ChatRequest, ChatRequestBuilder, ChatResponse, ChunkStream, FinishReason, Message,
    MessageRole, ProviderId, StreamChunk, StreamError, StreamEvent, StreamUnit, UnitStream, Usage,
};
