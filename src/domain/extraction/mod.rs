//! Structured extraction: composing action schemas and recovering validated JSON from model text

mod action;
pub mod discourse;
mod error;
mod parser;

pub use action::{compose, ActionDescriptor, ActionRegistry, UnionSchema, DEFAULT_ENVELOPE_FIELD};
pub use discourse::NodeType;
pub use error::{ComposeError, ExtractionError};
pub use parser::{extract, recover_json_text, ExtractionParser, ExtractionResult};
