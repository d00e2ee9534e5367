//! Infrastructure layer - provider wire mappings, credentials and services

pub mod credentials;
pub mod llm;
pub mod logging;
pub mod services;
