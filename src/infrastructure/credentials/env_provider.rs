use async_trait::async_trait;
use std::collections::HashMap;
use std::env;

use crate::domain::{Credential, CredentialProvider, DomainError};

/// Credential provider that reads the process environment on every call.
///
/// A credential name is read from the variable of the same name unless an
/// alias maps it to another variable. Blank values count as missing.
#[derive(Debug, Default)]
pub struct EnvCredentialProvider {
    aliases: HashMap<String, String>,
}

impl EnvCredentialProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read credential `name` from `env_var` instead
    pub fn with_alias(mut self, name: impl Into<String>, env_var: impl Into<String>) -> Self {
        self.aliases.insert(name.into(), env_var.into());
        self
    }

    fn env_var<'a>(&'a self, name: &'a str) -> &'a str {
        self.aliases.get(name).map(String::as_str).unwrap_or(name)
    }

    fn read(&self, name: &str) -> Option<String> {
        env::var(self.env_var(name))
            .ok()
            .filter(|value| !value.trim().is_empty())
    }
}

#[async_trait]
impl CredentialProvider for EnvCredentialProvider {
    async fn get_credential(&self, name: &str) -> Result<Credential, DomainError> {
        let api_key = self.read(name).ok_or_else(|| {
            DomainError::credential(format!(
                "Environment variable '{}' is not set",
                self.env_var(name)
            ))
        })?;

        Ok(Credential::new(name, api_key))
    }

    async fn supports(&self, name: &str) -> bool {
        self.read(name).is_some()
    }

    fn provider_name(&self) -> &'static str {
        "env"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[tokio::test]
    async fn test_env_provider_with_set_variable() {
        // SAFETY: Test runs in isolation
        unsafe { env::set_var("TEST_RELAY_OPENAI_KEY", "sk-test-123") };

        let provider =
            EnvCredentialProvider::new().with_alias("OPENAI_API_KEY", "TEST_RELAY_OPENAI_KEY");

        let cred = provider.get_credential("OPENAI_API_KEY").await.unwrap();
        assert_eq!(cred.name(), "OPENAI_API_KEY");
        assert_eq!(cred.api_key(), "sk-test-123");
        assert!(provider.supports("OPENAI_API_KEY").await);

        // SAFETY: Test cleanup
        unsafe { env::remove_var("TEST_RELAY_OPENAI_KEY") };
    }

    #[tokio::test]
    async fn test_env_provider_missing_variable() {
        let provider = EnvCredentialProvider::new();

        let err = provider
            .get_credential("NONEXISTENT_RELAY_VAR_12345")
            .await
            .unwrap_err();

        assert!(err.is_configuration());
        assert!(err.to_string().contains("NONEXISTENT_RELAY_VAR_12345"));
    }

    #[tokio::test]
    async fn test_blank_value_counts_as_missing() {
        // SAFETY: Test runs in isolation
        unsafe { env::set_var("TEST_RELAY_BLANK_KEY", "   ") };

        let provider = EnvCredentialProvider::new();
        assert!(!provider.supports("TEST_RELAY_BLANK_KEY").await);
        assert!(provider.get_credential("TEST_RELAY_BLANK_KEY").await.is_err());

        // SAFETY: Test cleanup
        unsafe { env::remove_var("TEST_RELAY_BLANK_KEY") };
    }
}
