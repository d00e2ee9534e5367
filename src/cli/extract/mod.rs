//! Extract command - runs the extraction parser on a local file

use std::io::Read;
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use serde_json::Value;

use crate::domain::extract;

#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// File with raw model output, or `-` for stdin
    #[arg(short, long, default_value = "-")]
    pub input: String,

    /// JSON Schema file the recovered value must satisfy
    #[arg(short, long)]
    pub schema: PathBuf,
}

pub async fn run(args: ExtractArgs) -> anyhow::Result<()> {
    let raw = read_input(&args.input)?;
    let schema_text = std::fs::read_to_string(&args.schema)
        .with_context(|| format!("Failed to read schema file {}", args.schema.display()))?;
    let schema: Value = serde_json::from_str(&schema_text)
        .with_context(|| format!("Schema file {} is not valid JSON", args.schema.display()))?;

    println!("{}", run_extraction(&raw, &schema)?);
    Ok(())
}

/// Pretty-printed recovered value, or the typed error with its code
fn run_extraction(raw: &str, schema: &Value) -> anyhow::Result<String> {
    let result = extract(raw, schema).map_err(|e| anyhow::anyhow!("[{}] {}", e.code(), e))?;
    Ok(serde_json::to_string_pretty(result.value())?)
}

fn read_input(input: &str) -> anyhow::Result<String> {
    if input == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read stdin")?;
        return Ok(buffer);
    }

    std::fs::read_to_string(input).with_context(|| format!("Failed to read input file {}", input))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> Value {
        json!({
            "type": "object",
            "properties": {"title": {"type": "string"}},
            "required": ["title"]
        })
    }

    #[test]
    fn test_fenced_output_is_recovered() {
        let output = run_extraction("```json\n{\"title\": \"Notes\",}\n```", &schema()).unwrap();
        let value: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value, json!({"title": "Notes"}));
    }

    #[test]
    fn test_errors_carry_code() {
        let err = run_extraction("no json here", &schema()).unwrap_err();
        assert!(err.to_string().starts_with("[parse-failure]"));

        let err = run_extraction(r#"{"name": "x"}"#, &schema()).unwrap_err();
        assert!(err.to_string().starts_with("[validation-failure]"));
    }

    #[test]
    fn test_read_input_from_file() {
        let path = std::env::temp_dir().join(format!("relay-extract-{}.txt", std::process::id()));
        std::fs::write(&path, "{\"title\": \"x\"}").unwrap();

        let text = read_input(path.to_str().unwrap()).unwrap();
        assert_eq!(text, "{\"title\": \"x\"}");

        std::fs::remove_file(path).ok();
        assert!(read_input("/nonexistent/relay-input.txt").is_err());
    }
}
