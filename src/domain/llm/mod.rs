//! LLM domain models: normalized requests, responses and stream events

mod message;
mod provider;
mod request;
mod response;
mod stream;

pub use message::{Message, MessageRole};
pub use provider::{AuthScheme, ProviderId};
pub use request::{ChatRequest, ChatRequestBuilder};
pub use response::{
    ChatResponse, FinishReason, StreamChunk, StreamError, StreamEvent, StreamUnit, Usage,
};
pub use stream::{ChunkStream, UnitStream};
