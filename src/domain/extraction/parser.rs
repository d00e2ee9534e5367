//! Recovery of structured data from free-text model output
//!
//! The pipeline is linear: trim, strip a leading code fence, slice to the
//! outermost object braces, drop trailing commas, parse, validate. Each step
//! either advances the text or leaves it untouched; a later failure never
//! triggers an alternate repair.
//!
//! Trailing-comma removal is a single text substitution. It does not repair
//! missing commas or nested damage, and it also rewrites `,}` / `,]` that
//! appear inside string literals.

use jsonschema::JSONSchema;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::ExtractionError;

static OPENING_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^```[A-Za-z0-9_+.\-]*[ \t]*\r?\n?").unwrap());

static CLOSING_FENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\r?\n?```$").unwrap());

static TRAILING_COMMA: Lazy<Regex> = Lazy::new(|| Regex::new(r",(\s*[}\]])").unwrap());

/// Value recovered from model output that passed schema validation
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionResult(Value);

impl ExtractionResult {
    pub fn value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// Convert into a caller-defined type
    pub fn deserialize<T: DeserializeOwned>(self) -> Result<T, ExtractionError> {
        serde_json::from_value(self.0).map_err(|e| ExtractionError::validation(vec![e.to_string()]))
    }
}

/// Extraction parser bound to one compiled target schema
pub struct ExtractionParser {
    schema: JSONSchema,
}

impl std::fmt::Debug for ExtractionParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractionParser").finish_non_exhaustive()
    }
}

impl ExtractionParser {
    pub fn new(target_schema: &Value) -> Result<Self, ExtractionError> {
        let schema = JSONSchema::compile(target_schema)
            .map_err(|e| ExtractionError::invalid_schema(e.to_string()))?;

        Ok(Self { schema })
    }

    pub fn extract(&self, raw_text: &str) -> Result<ExtractionResult, ExtractionError> {
        let candidate = recover_json_text(raw_text);

        let value: Value = serde_json::from_str(&candidate)
            .map_err(|e| ExtractionError::parse(format!("invalid JSON: {}", e)))?;

        let errors: Vec<String> = match self.schema.validate(&value) {
            Ok(()) => Vec::new(),
            Err(errors) => errors.map(|e| describe_violation(&e)).collect(),
        };

        if errors.is_empty() {
            Ok(ExtractionResult(value))
        } else {
            Err(ExtractionError::validation(errors))
        }
    }
}

/// Recover `raw_text` as JSON and validate it against `target_schema`
pub fn extract(raw_text: &str, target_schema: &Value) -> Result<ExtractionResult, ExtractionError> {
    ExtractionParser::new(target_schema)?.extract(raw_text)
}

/// Text repair steps that run before parsing
pub fn recover_json_text(raw_text: &str) -> String {
    let text = raw_text.trim();
    let text = strip_code_fence(text);
    let text = slice_outer_object(text);
    remove_trailing_commas(text)
}

fn strip_code_fence(text: &str) -> &str {
    if !text.starts_with("```") {
        return text;
    }

    let without_open = match OPENING_FENCE.find(text) {
        Some(m) => &text[m.end()..],
        None => text,
    };

    let without_close = match CLOSING_FENCE.find(without_open) {
        Some(m) => &without_open[..m.start()],
        None => without_open,
    };

    without_close.trim()
}

fn slice_outer_object(text: &str) -> &str {
    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => text,
    }
}

fn remove_trailing_commas(text: &str) -> String {
    TRAILING_COMMA.replace_all(text, "$1").into_owned()
}

fn describe_violation(error: &jsonschema::ValidationError<'_>) -> String {
    let path = error.instance_path.to_string();
    if path.is_empty() {
        error.to_string()
    } else {
        format!("{}: {}", path, error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    fn number_a_schema() -> Value {
        json!({
            "type": "object",
            "properties": {"a": {"type": "number"}},
            "required": ["a"]
        })
    }

    #[test]
    fn test_plain_object_round_trip() {
        let value = json!({"a": 1, "b": "text", "nested": {"list": [1, 2, 3]}});
        let result = extract(&value.to_string(), &number_a_schema()).unwrap();
        assert_eq!(result.into_value(), value);
    }

    #[test]
    fn test_pretty_printed_round_trip() {
        let value = json!({"a": 2.5, "tags": ["x", "y"]});
        let text = serde_json::to_string_pretty(&value).unwrap();
        let result = extract(&text, &number_a_schema()).unwrap();
        assert_eq!(result.value(), &value);
    }

    #[test]
    fn test_code_fenced_json() {
        let result = extract("```json\n{\"a\":1}\n```", &number_a_schema()).unwrap();
        assert_eq!(result.into_value(), json!({"a": 1}));
    }

    #[test]
    fn test_code_fence_without_language_tag() {
        let result = extract("```\n{\"a\": 3}\n```", &number_a_schema()).unwrap();
        assert_eq!(result.into_value(), json!({"a": 3}));
    }

    #[test]
    fn test_trailing_commas_are_removed() {
        let result = extract(r#"{"a":1,}"#, &number_a_schema()).unwrap();
        assert_eq!(result.into_value(), json!({"a": 1}));

        let result = extract("{\"a\": 1, \"list\": [1, 2,\n]\n,}", &number_a_schema()).unwrap();
        assert_eq!(result.into_value(), json!({"a": 1, "list": [1, 2]}));
    }

    #[test]
    fn test_surrounding_prose_is_discarded() {
        let text = "Sure! Here is the data you asked for: {\"a\": 7} Let me know if you need more.";
        let result = extract(text, &number_a_schema()).unwrap();
        assert_eq!(result.into_value(), json!({"a": 7}));
    }

    #[test]
    fn test_prose_only_is_parse_failure() {
        let err = extract("no JSON here", &number_a_schema()).unwrap_err();
        assert!(matches!(err, ExtractionError::Parse { .. }));
    }

    #[test]
    fn test_truncated_json_is_parse_failure() {
        let err = extract(r#"{"a": 1, "b": [1, 2"#, &number_a_schema()).unwrap_err();
        assert!(matches!(err, ExtractionError::Parse { .. }));
    }

    #[test]
    fn test_wrong_shape_is_validation_failure() {
        let err = extract(r#"{"a": "one"}"#, &number_a_schema()).unwrap_err();
        match err {
            ExtractionError::Validation { errors } => {
                assert_eq!(errors.len(), 1);
                assert!(errors[0].starts_with("/a"));
            }
            other => panic!("expected validation failure, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_comma_is_not_repaired() {
        let err = extract(r#"{"a": 1 "b": 2}"#, &number_a_schema()).unwrap_err();
        assert!(matches!(err, ExtractionError::Parse { .. }));
    }

    #[test]
    fn test_invalid_schema_is_reported() {
        let err = ExtractionParser::new(&json!({"type": 12})).unwrap_err();
        assert!(matches!(err, ExtractionError::InvalidSchema { .. }));
    }

    #[test]
    fn test_parser_is_reusable() {
        let parser = ExtractionParser::new(&number_a_schema()).unwrap();
        assert!(parser.extract(r#"{"a": 1}"#).is_ok());
        assert!(parser.extract(r#"{"a": 2,}"#).is_ok());
        assert!(parser.extract("nothing").is_err());
    }

    #[test]
    fn test_deserialize_into_caller_type() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct Target {
            a: f64,
        }

        let result = extract("```json\n{\"a\": 4}\n```", &number_a_schema()).unwrap();
        assert_eq!(result.deserialize::<Target>().unwrap(), Target { a: 4.0 });
    }

    #[test]
    fn test_recover_json_text_steps() {
        assert_eq!(recover_json_text("  ```json\n{\"a\":1,}\n```  "), "{\"a\":1}");
        assert_eq!(recover_json_text("plain"), "plain");
    }
}
