//! CLI module for the LLM relay gateway
//!
//! - `serve`: runs the HTTP gateway
//! - `providers`: prints the provider registry and credential status
//! - `extract`: recovers and validates JSON from a file of model output

pub mod extract;
pub mod providers;
pub mod serve;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;

/// LLM Relay Gateway - one normalized interface for OpenAI, Anthropic and Gemini
#[derive(Parser)]
#[command(name = "llm-relay-gateway")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP gateway
    Serve,

    /// List providers and whether their credentials are configured
    Providers,

    /// Recover a schema-valid JSON value from raw model output
    Extract(extract::ExtractArgs),
}

/// Load `.env` and the layered configuration; defaults apply when loading fails.
///
/// The load error is returned alongside so it can be logged once logging is up.
pub fn load_config() -> (AppConfig, Option<config::ConfigError>) {
    dotenvy::dotenv().ok();

    match AppConfig::load() {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    }
}
