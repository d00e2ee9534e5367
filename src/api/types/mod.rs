//! Wire types of the gateway API

pub mod chat;
pub mod error;
pub mod extract;
pub mod json;
pub mod providers;

pub use chat::{stream_event_payload, ChatMessageBody, ChatRequestBody, StreamErrorBody};
pub use error::{ApiError, ApiErrorDetail, ApiErrorResponse};
pub use extract::{ExtractRequestBody, ExtractResponseBody};
pub use json::Json;
pub use providers::{ProviderInfo, ProvidersResponse};
