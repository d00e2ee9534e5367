use std::fmt;

/// Secret resolved for one provider call
#[derive(Clone)]
pub struct Credential {
    name: String,
    api_key: String,
}

impl Credential {
    pub fn new(name: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            api_key: api_key.into(),
        }
    }

    /// Name of the configuration entry the secret was read from
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("name", &self.name)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_creation() {
        let cred = Credential::new("OPENAI_API_KEY", "sk-test-key");

        assert_eq!(cred.name(), "OPENAI_API_KEY");
        assert_eq!(cred.api_key(), "sk-test-key");
    }

    #[test]
    fn test_debug_redacts_secret() {
        let cred = Credential::new("OPENAI_API_KEY", "sk-test-key");
        let debug = format!("{:?}", cred);

        assert!(debug.contains("OPENAI_API_KEY"));
        assert!(!debug.contains("sk-test-key"));
    }
}
