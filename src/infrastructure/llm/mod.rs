//! LLM provider wire mappings, outbound HTTP and stream relay

mod anthropic;
mod gemini;
mod http_client;
mod openai;
mod registry;
mod relay;

pub use http_client::{provider_error_message, ByteStream, Headers, HttpClient, HttpClientTrait};
pub use registry::{ProviderConfig, ProviderRegistry};
pub use relay::{decode_units, spawn_relay};

#[cfg(test)]
pub use http_client::mock;
