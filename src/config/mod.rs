//! Application configuration

mod app_config;

pub use app_config::{AppConfig, CorsConfig, GatewayConfig, LogFormat, LoggingConfig, ServerConfig};
