use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;

use crate::domain::{DomainError, ProviderId};

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub gateway: GatewayConfig,
    pub cors: CorsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Provider gateway settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Ceiling for one provider call, in seconds
    pub request_timeout_secs: u64,
    /// Chunks buffered between a provider stream and a slow caller
    pub stream_buffer: usize,
    /// Reject chat requests that carry no Authorization header
    pub require_auth_header: bool,
    /// Providers to expose; empty means all
    pub enabled_providers: Vec<String>,
    /// Base URL overrides keyed by provider id
    pub base_urls: HashMap<String, String>,
}

/// Cross-origin policy
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Allowed origins, matched exactly or by prefix; empty allows any origin
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 300,
            stream_buffer: 32,
            require_auth_header: true,
            enabled_providers: Vec::new(),
            base_urls: HashMap::new(),
        }
    }
}

impl GatewayConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Enabled provider ids; an unknown name is a configuration error
    pub fn provider_ids(&self) -> Result<Vec<ProviderId>, DomainError> {
        self.enabled_providers
            .iter()
            .map(|name| name.parse())
            .collect()
    }

    pub fn base_url_overrides(&self) -> Result<HashMap<ProviderId, String>, DomainError> {
        self.base_urls
            .iter()
            .map(|(name, url)| Ok((name.parse()?, url.clone())))
            .collect()
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("gateway.enabled_providers")
                    .with_list_parse_key("cors.allowed_origins")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
