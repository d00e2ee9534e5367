//! Built-in action pack for discourse-graph node extraction

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::{ActionDescriptor, ActionRegistry};

/// Property holding the node list in the model output
pub const NODES_FIELD: &str = "nodes";
pub const TITLE_FIELD: &str = "paperTitle";
pub const AUTHORS_FIELD: &str = "paperAuthors";

/// Longest source text sent to a model, in characters
pub const MAX_SOURCE_CHARS: usize = 180_000;

static INLINE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\S\r\n]+").unwrap());

/// Discourse-graph node kinds, identified by a three-letter code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NodeType {
    Clm,
    Que,
    Evd,
    Src,
    Iss,
    Res,
    Exp,
    Thr,
    Art,
    Mtd,
    Pat,
    Hyp,
    Con,
}

impl NodeType {
    pub const ALL: [NodeType; 13] = [
        NodeType::Clm,
        NodeType::Que,
        NodeType::Evd,
        NodeType::Src,
        NodeType::Iss,
        NodeType::Res,
        NodeType::Exp,
        NodeType::Thr,
        NodeType::Art,
        NodeType::Mtd,
        NodeType::Pat,
        NodeType::Hyp,
        NodeType::Con,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Self::Clm => "CLM",
            Self::Que => "QUE",
            Self::Evd => "EVD",
            Self::Src => "SRC",
            Self::Iss => "ISS",
            Self::Res => "RES",
            Self::Exp => "EXP",
            Self::Thr => "THR",
            Self::Art => "ART",
            Self::Mtd => "MTD",
            Self::Pat => "PAT",
            Self::Hyp => "HYP",
            Self::Con => "CON",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Clm => "Claim",
            Self::Que => "Question",
            Self::Evd => "Evidence",
            Self::Src => "Source",
            Self::Iss => "Issue",
            Self::Res => "Result",
            Self::Exp => "Experiment",
            Self::Thr => "Theory",
            Self::Art => "Artifact",
            Self::Mtd => "Method",
            Self::Pat => "Pattern",
            Self::Hyp => "Hypothesis",
            Self::Con => "Conclusion",
        }
    }

    /// One-line meaning, used when describing the task to a model
    pub fn summary(&self) -> &'static str {
        match self {
            Self::Clm => "a specific, falsifiable assertion made by the text",
            Self::Que => "a research question posed or implied",
            Self::Evd => "an observation or finding that supports or refutes a claim",
            Self::Src => "a referenced bibliographic source",
            Self::Iss => "an open problem or unresolved tension",
            Self::Res => "a concrete outcome of an experiment or analysis",
            Self::Exp => "an experimental procedure or empirical study",
            Self::Thr => "a theoretical framework or conceptual model",
            Self::Art => "a tool, dataset, protocol or other produced artifact",
            Self::Mtd => "a methodology or analytical technique",
            Self::Pat => "a recurring trend or regularity",
            Self::Hyp => "a testable prediction",
            Self::Con => "a synthesized takeaway drawn by the authors",
        }
    }

    /// Schema of one extracted node of this type
    pub fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "type": { "const": self.code() },
                "content": { "type": "string", "minLength": 1 },
                "sourceQuote": { "type": "string" },
                "pageNumber": { "type": "number" },
                "section": { "type": "string" },
                "confidence": { "type": "number", "minimum": 0, "maximum": 1 },
                "reasoning": { "type": "string" }
            },
            "required": ["type", "content"]
        })
    }

    pub fn action(&self) -> ActionDescriptor {
        ActionDescriptor::new(self.code(), self.schema())
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for NodeType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.code().eq_ignore_ascii_case(wanted) || t.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("Unknown discourse node type: {}", value))
    }
}

/// Registry holding one action per requested node type, in the given order
pub fn discourse_registry(types: &[NodeType]) -> ActionRegistry {
    types.iter().map(NodeType::action).collect()
}

/// Task instruction listing the requested node types
pub fn discourse_instruction(types: &[NodeType]) -> String {
    let mut text = String::from(
        "Extract discourse-graph nodes from the provided text. \
         Each node has a `type` code and a concise `content` statement; \
         add `sourceQuote`, `pageNumber`, `section`, `confidence` (0 to 1) and `reasoning` when known.\n\
         Requested node types:",
    );

    for node_type in types {
        text.push_str(&format!(
            "\n- {} ({}): {}",
            node_type.code(),
            node_type.label(),
            node_type.summary()
        ));
    }

    text
}

/// Optional document metadata accepted next to the node list
pub fn metadata_properties() -> Map<String, Value> {
    let mut properties = Map::new();
    properties.insert(TITLE_FIELD.to_string(), json!({ "type": "string" }));
    properties.insert(
        AUTHORS_FIELD.to_string(),
        json!({ "type": "array", "items": { "type": "string" } }),
    );
    properties
}

/// Clean source text before it is sent to a model.
///
/// Control characters other than tab, newline and carriage return are
/// dropped, runs of other whitespace collapse to one space, and the result
/// is trimmed and capped at [`MAX_SOURCE_CHARS`].
pub fn normalize_source_text(text: &str) -> String {
    let stripped: String = text
        .chars()
        .filter(|c| !c.is_ascii_control() || matches!(c, '\t' | '\n' | '\r'))
        .collect();
    let collapsed = INLINE_WHITESPACE.replace_all(&stripped, " ");
    let trimmed = collapsed.trim();

    match trimmed.char_indices().nth(MAX_SOURCE_CHARS) {
        Some((end, _)) => trimmed[..end].to_string(),
        None => trimmed.to_string(),
    }
}

/// User prompt carrying the requested types, an optional focus question and the source text
pub fn discourse_prompt(text: &str, types: &[NodeType], research_question: Option<&str>) -> String {
    let type_list = types
        .iter()
        .map(|t| format!("{} ({})", t.code(), t.label()))
        .collect::<Vec<_>>()
        .join(", ");

    let mut prompt = format!("Extract the following node types from this text: {}\n\n", type_list);

    if let Some(question) = research_question.map(str::trim).filter(|q| !q.is_empty()) {
        prompt.push_str(&format!("Research question to focus on: {}\n\n", question));
    }

    prompt.push_str("Text:\n\n");
    prompt.push_str(text);
    prompt
}
