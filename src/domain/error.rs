use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Normalized error category reported to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    BadRequest,
    Configuration,
    Upstream,
    Timeout,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BadRequest => write!(f, "bad-request"),
            Self::Configuration => write!(f, "configuration"),
            Self::Upstream => write!(f, "upstream"),
            Self::Timeout => write!(f, "timeout"),
        }
    }
}

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Provider not found: {provider}")]
    ProviderNotFound { provider: String },

    #[error("Credential error: {message}")]
    Credential { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Upstream error ({}): {message}", .status.map_or_else(|| "no status".to_string(), |s| s.to_string()))]
    Upstream { status: Option<u16>, message: String },

    #[error("Timeout: provider call exceeded {}s", .after.as_secs())]
    Timeout { after: Duration },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn provider_not_found(provider: impl Into<String>) -> Self {
        Self::ProviderNotFound {
            provider: provider.into(),
        }
    }

    pub fn credential(message: impl Into<String>) -> Self {
        Self::Credential {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Provider replied with an error status or an unusable payload
    pub fn upstream(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Upstream {
            status,
            message: message.into(),
        }
    }

    /// Provider payload could not be decoded
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::upstream(None, message)
    }

    pub fn timeout(after: Duration) -> Self {
        Self::Timeout { after }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Normalized category; provider 4xx replies count as caller errors
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::BadRequest,
            Self::ProviderNotFound { .. } | Self::Credential { .. } | Self::Configuration { .. } => {
                ErrorKind::Configuration
            }
            Self::Upstream {
                status: Some(status),
                ..
            } if (400..500).contains(status) => ErrorKind::BadRequest,
            Self::Upstream { .. } | Self::Internal { .. } => ErrorKind::Upstream,
            Self::Timeout { .. } => ErrorKind::Timeout,
        }
    }

    /// Whether the failure is a deployment fault rather than a caller or provider fault
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::ProviderNotFound { .. } | Self::Credential { .. } | Self::Configuration { .. }
        )
    }
}
