use thiserror::Error;

/// Failure recovering structured data from model output
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ExtractionError {
    /// Text could not be recovered as JSON
    #[error("Parse failure: {message}")]
    Parse { message: String },

    /// JSON was recovered but does not match the target schema
    #[error("Validation failure: {}", .errors.join("; "))]
    Validation { errors: Vec<String> },

    /// The target schema itself does not compile
    #[error("Invalid target schema: {message}")]
    InvalidSchema { message: String },
}

impl ExtractionError {
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    pub fn validation(errors: Vec<String>) -> Self {
        Self::Validation { errors }
    }

    pub fn invalid_schema(message: impl Into<String>) -> Self {
        Self::InvalidSchema {
            message: message.into(),
        }
    }

    /// Stable code reported to callers
    pub fn code(&self) -> &'static str {
        match self {
            Self::Parse { .. } => "parse-failure",
            Self::Validation { .. } => "validation-failure",
            Self::InvalidSchema { .. } => "invalid-schema",
        }
    }
}

/// Failure composing the output schema of an extraction task
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ComposeError {
    #[error("No action schemas registered; an extraction task needs at least one")]
    EmptySet,
}

impl ComposeError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptySet => "empty-action-set",
        }
    }
}
