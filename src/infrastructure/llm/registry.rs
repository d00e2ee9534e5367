//! Provider registry: endpoint, auth and payload mapping per provider

use std::collections::BTreeMap;
use std::collections::HashMap;

use serde_json::Value;

use super::http_client::Headers;
use super::{anthropic, gemini, openai};
use crate::domain::{
    AuthScheme, ChatRequest, ChatResponse, DomainError, ProviderId, StreamUnit,
};

/// Immutable description of one provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    id: ProviderId,
    base_url: String,
    default_model: String,
}

impl ProviderConfig {
    /// Entry with the provider's public endpoint and default model
    pub fn new(id: ProviderId) -> Self {
        let (base_url, default_model) = match id {
            ProviderId::OpenAi => (openai::DEFAULT_BASE_URL, openai::DEFAULT_MODEL),
            ProviderId::Anthropic => (anthropic::DEFAULT_BASE_URL, anthropic::DEFAULT_MODEL),
            ProviderId::Gemini => (gemini::DEFAULT_BASE_URL, gemini::DEFAULT_MODEL),
        };

        Self {
            id,
            base_url: base_url.to_string(),
            default_model: default_model.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    pub fn id(&self) -> ProviderId {
        self.id
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    /// Name of the credential the provider requires
    pub fn credential_name(&self) -> &'static str {
        match self.id {
            ProviderId::OpenAi => openai::CREDENTIAL_NAME,
            ProviderId::Anthropic => anthropic::CREDENTIAL_NAME,
            ProviderId::Gemini => gemini::CREDENTIAL_NAME,
        }
    }

    pub fn auth_scheme(&self) -> AuthScheme {
        match self.id {
            ProviderId::OpenAi => AuthScheme::Bearer,
            ProviderId::Anthropic => AuthScheme::Header(anthropic::API_KEY_HEADER),
            ProviderId::Gemini => AuthScheme::QueryParam(gemini::API_KEY_PARAM),
        }
    }

    /// Whether the provider enforces a response schema itself
    pub fn supports_native_schema(&self) -> bool {
        match self.id {
            ProviderId::OpenAi | ProviderId::Gemini => true,
            ProviderId::Anthropic => false,
        }
    }

    /// Whether the end of the response body completes a stream. Providers
    /// with an end marker treat an earlier close as a failure.
    pub fn ends_at_eof(&self) -> bool {
        match self.id {
            ProviderId::Gemini => true,
            ProviderId::OpenAi | ProviderId::Anthropic => false,
        }
    }

    pub fn resolve_model<'a>(&'a self, request: &'a ChatRequest) -> &'a str {
        request
            .model
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(&self.default_model)
    }

    /// Endpoint without credentials; safe to log
    pub fn endpoint(&self, model: &str, stream: bool) -> String {
        match self.id {
            ProviderId::OpenAi => openai::endpoint(&self.base_url),
            ProviderId::Anthropic => anthropic::endpoint(&self.base_url),
            ProviderId::Gemini => gemini::endpoint(&self.base_url, model, stream),
        }
    }

    /// Endpoint with the credential attached when the provider expects it in the URL
    pub fn request_url(&self, model: &str, stream: bool, api_key: &str) -> Result<String, DomainError> {
        let endpoint = self.endpoint(model, stream);

        match self.auth_scheme() {
            AuthScheme::QueryParam(param) => reqwest::Url::parse_with_params(&endpoint, &[(param, api_key)])
                .map(String::from)
                .map_err(|e| {
                    DomainError::configuration(format!("Invalid {} base URL: {}", self.id, e))
                }),
            AuthScheme::Bearer | AuthScheme::Header(_) => Ok(endpoint),
        }
    }

    pub fn headers(&self, api_key: &str) -> Headers {
        let mut headers = vec![("content-type".to_string(), "application/json".to_string())];

        match self.auth_scheme() {
            AuthScheme::Bearer => {
                headers.push(("authorization".to_string(), format!("Bearer {}", api_key)));
            }
            AuthScheme::Header(name) => headers.push((name.to_string(), api_key.to_string())),
            AuthScheme::QueryParam(_) => {}
        }

        if self.id == ProviderId::Anthropic {
            headers.extend(
                anthropic::extra_headers()
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string())),
            );
        }

        headers
    }

    /// Provider request body. Without native schema support the schema is
    /// appended to the prompt as its last instruction.
    pub fn build_body(&self, request: &ChatRequest, model: &str, stream: bool) -> Value {
        if request.response_schema.is_some() && !self.supports_native_schema() {
            let prepared = request.clone().with_schema_instruction();
            return self.build_native_body(&prepared, model, stream);
        }

        self.build_native_body(request, model, stream)
    }

    fn build_native_body(&self, request: &ChatRequest, model: &str, stream: bool) -> Value {
        match self.id {
            ProviderId::OpenAi => openai::build_body(request, model, stream),
            ProviderId::Anthropic => anthropic::build_body(request, model, stream),
            ProviderId::Gemini => gemini::build_body(request),
        }
    }

    pub fn parse_response(&self, json: Value) -> Result<ChatResponse, DomainError> {
        match self.id {
            ProviderId::OpenAi => openai::parse_response(json),
            ProviderId::Anthropic => anthropic::parse_response(json),
            ProviderId::Gemini => gemini::parse_response(json),
        }
    }

    /// Decode the data field of one server-sent event
    pub fn parse_stream_data(&self, data: &str) -> Result<StreamUnit, DomainError> {
        match self.id {
            ProviderId::OpenAi => openai::parse_stream_data(data),
            ProviderId::Anthropic => anthropic::parse_stream_data(data),
            ProviderId::Gemini => gemini::parse_stream_data(data),
        }
    }
}

/// Read-only table of provider entries, built once at startup
#[derive(Debug, Clone)]
pub struct ProviderRegistry {
    providers: BTreeMap<ProviderId, ProviderConfig>,
}

impl ProviderRegistry {
    pub fn new(providers: impl IntoIterator<Item = ProviderConfig>) -> Self {
        Self {
            providers: providers.into_iter().map(|p| (p.id(), p)).collect(),
        }
    }

    /// Every supported provider with its public endpoint
    pub fn with_defaults() -> Self {
        Self::new(ProviderId::ALL.into_iter().map(ProviderConfig::new))
    }

    /// Default entries restricted to `enabled` (all when empty), with base URL overrides applied
    pub fn configured(
        enabled: &[ProviderId],
        base_urls: &HashMap<ProviderId, String>,
    ) -> Self {
        Self::new(
            ProviderId::ALL
                .into_iter()
                .filter(|id| enabled.is_empty() || enabled.contains(id))
                .map(|id| match base_urls.get(&id) {
                    Some(url) => ProviderConfig::new(id).with_base_url(url.as_str()),
                    None => ProviderConfig::new(id),
                }),
        )
    }

    /// Resolve a caller-supplied identifier
    pub fn lookup(&self, provider: &str) -> Result<&ProviderConfig, DomainError> {
        let id: ProviderId = provider.parse()?;
        self.get(id)
            .ok_or_else(|| DomainError::provider_not_found(provider))
    }

    pub fn get(&self, id: ProviderId) -> Option<&ProviderConfig> {
        self.providers.get(&id)
    }

    /// Entries in a stable order
    pub fn providers(&self) -> impl Iterator<Item = &ProviderConfig> {
        self.providers.values()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn header<'a>(headers: &'a Headers, name: &str) -> Option<&'a str> {
        headers
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_only_gemini_ends_at_eof() {
        assert!(ProviderConfig::new(ProviderId::Gemini).ends_at_eof());
        assert!(!ProviderConfig::new(ProviderId::OpenAi).ends_at_eof());
        assert!(!ProviderConfig::new(ProviderId::Anthropic).ends_at_eof());
    }

    #[test]
    fn test_lookup_known_and_unknown() {
        let registry = ProviderRegistry::with_defaults();

        assert_eq!(registry.lookup("openai").unwrap().id(), ProviderId::OpenAi);
        assert_eq!(registry.lookup("Gemini").unwrap().id(), ProviderId::Gemini);

        let err = registry.lookup("mistral").unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_disabled_provider_is_not_found() {
        let registry = ProviderRegistry::configured(&[ProviderId::Anthropic], &HashMap::new());

        assert_eq!(registry.len(), 1);
        assert!(matches!(
            registry.lookup("openai"),
            Err(DomainError::ProviderNotFound { .. })
        ));
    }

    #[test]
    fn test_base_url_override() {
        let mut urls = HashMap::new();
        urls.insert(ProviderId::OpenAi, "http://localhost:9000/".to_string());

        let registry = ProviderRegistry::configured(&[], &urls);
        let openai = registry.get(ProviderId::OpenAi).unwrap();

        assert_eq!(openai.base_url(), "http://localhost:9000");
        assert_eq!(
            openai.endpoint("gpt-4o", false),
            "http://localhost:9000/v1/chat/completions"
        );
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_providers_in_stable_order() {
        let ids: Vec<ProviderId> = ProviderRegistry::with_defaults()
            .providers()
            .map(|p| p.id())
            .collect();
        assert_eq!(ids, ProviderId::ALL.to_vec());
    }

    #[test]
    fn test_auth_headers_per_provider() {
        let registry = ProviderRegistry::with_defaults();

        let openai = registry.get(ProviderId::OpenAi).unwrap().headers("sk-1");
        assert_eq!(header(&openai, "authorization"), Some("Bearer sk-1"));

        let anthropic = registry.get(ProviderId::Anthropic).unwrap().headers("sk-2");
        assert_eq!(header(&anthropic, "x-api-key"), Some("sk-2"));
        assert_eq!(header(&anthropic, "anthropic-version"), Some("2023-06-01"));
        assert_eq!(header(&anthropic, "authorization"), None);

        let gemini = registry.get(ProviderId::Gemini).unwrap().headers("g-3");
        assert_eq!(header(&gemini, "authorization"), None);
        assert_eq!(header(&gemini, "x-api-key"), None);
    }

    #[test]
    fn test_gemini_key_goes_in_query() {
        let gemini = ProviderConfig::new(ProviderId::Gemini).with_base_url("https://g.example");

        assert_eq!(
            gemini.request_url("gemini-2.5-flash", false, "abc").unwrap(),
            "https://g.example/v1beta/models/gemini-2.5-flash:generateContent?key=abc"
        );
        assert_eq!(
            gemini.request_url("gemini-2.5-flash", true, "abc").unwrap(),
            "https://g.example/v1beta/models/gemini-2.5-flash:streamGenerateContent?alt=sse&key=abc"
        );

        let openai = ProviderConfig::new(ProviderId::OpenAi);
        assert!(!openai.request_url("gpt-4o", false, "abc").unwrap().contains("abc"));
    }

    #[test]
    fn test_resolve_model_defaults() {
        let config = ProviderConfig::new(ProviderId::Anthropic).with_default_model("claude-x");

        let request = ChatRequest::builder().user("hi").build();
        assert_eq!(config.resolve_model(&request), "claude-x");

        let request = ChatRequest::builder().user("hi").model("claude-y").build();
        assert_eq!(config.resolve_model(&request), "claude-y");
    }

    #[test]
    fn test_schema_goes_to_prompt_without_native_support() {
        let schema = json!({"type": "object", "properties": {"a": {"type": "number"}}});
        let request = ChatRequest::builder()
            .user("Give me a")
            .response_schema(schema)
            .build();

        let anthropic = ProviderConfig::new(ProviderId::Anthropic);
        let body = anthropic.build_body(&request, "claude-x", false);
        let prompt = body["messages"][0]["content"].as_str().unwrap();

        assert!(prompt.starts_with("Give me a\n\n"));
        assert!(prompt.contains("\"properties\""));
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);

        let openai = ProviderConfig::new(ProviderId::OpenAi);
        let body = openai.build_body(&request, "gpt-4o", false);
        assert_eq!(body["messages"][0]["content"], "Give me a");
        assert!(body.get("response_format").is_some());
    }

    #[test]
    fn test_mapping_is_total_for_every_provider() {
        let request = ChatRequest::builder()
            .system("sys")
            .user("hi")
            .temperature(0.2)
            .max_output_tokens(10)
            .response_schema(json!({"type": "object"}))
            .build();

        for config in ProviderRegistry::with_defaults().providers() {
            let model = config.resolve_model(&request).to_string();
            let body = config.build_body(&request, &model, true);
            assert!(body.is_object(), "{} produced a non-object body", config.id());
            assert!(!config.endpoint(&model, true).is_empty());
        }
    }
}
