//! Providers command - prints the registry and credential status

use std::fmt::Write as _;

use crate::domain::CredentialProvider;
use crate::infrastructure::credentials::EnvCredentialProvider;
use crate::infrastructure::llm::ProviderRegistry;

pub async fn run() -> anyhow::Result<()> {
    let (config, load_error) = super::load_config();
    if let Some(e) = load_error {
        eprintln!("warning: failed to load configuration, using defaults: {}", e);
    }

    let registry = crate::create_registry(&config)?;
    let table = render(&registry, &EnvCredentialProvider::new()).await;
    print!("{}", table);

    Ok(())
}

/// One line per provider: id, default model, base URL, schema support, credential status
pub async fn render(registry: &ProviderRegistry, credentials: &dyn CredentialProvider) -> String {
    let mut out = format!(
        "{:<10} {:<28} {:<44} {:<8} {}\n",
        "PROVIDER", "DEFAULT MODEL", "BASE URL", "SCHEMA", "CREDENTIAL"
    );

    for config in registry.providers() {
        let credential = if credentials.supports(config.credential_name()).await {
            format!("{} (set)", config.credential_name())
        } else {
            format!("{} (missing)", config.credential_name())
        };
        let schema = if config.supports_native_schema() {
            "native"
        } else {
            "prompt"
        };

        let _ = writeln!(
            out,
            "{:<10} {:<28} {:<44} {:<8} {}",
            config.id(),
            config.default_model(),
            config.base_url(),
            schema,
            credential
        );
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::credentials::mock::MockCredentialProvider;
    use crate::domain::Credential;

    #[tokio::test]
    async fn test_render_reports_credential_status() {
        let credentials = MockCredentialProvider::new("mock")
            .with_credential(Credential::new("OPENAI_API_KEY", "sk-test"));

        let table = render(&ProviderRegistry::with_defaults(), &credentials).await;
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[1].starts_with("openai"));
        assert!(lines[1].contains("OPENAI_API_KEY (set)"));
        assert!(lines[2].contains("prompt"));
        assert!(lines[3].contains("GEMINI_API_KEY (missing)"));
        assert!(!table.contains("sk-test"));
    }
}
