use async_trait::async_trait;
use std::fmt::Debug;

use super::Credential;
use crate::domain::DomainError;

/// Source of provider credentials, consulted on every call
#[async_trait]
pub trait CredentialProvider: Send + Sync + Debug {
    /// Resolve the credential stored under `name`
    async fn get_credential(&self, name: &str) -> Result<Credential, DomainError>;

    /// Check whether a credential is currently available under `name`
    async fn supports(&self, name: &str) -> bool;

    /// Get provider name for logging/debugging
    fn provider_name(&self) -> &'static str;
}
