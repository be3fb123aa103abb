//! Normalized observations — the uniform shape every tool response is
//! reduced to before the reasoning loop sees it.
//!
//! Invariant: `output` is never empty when `success` is true. A success with
//! no extractable content is replaced by a placeholder informational string,
//! because an empty observation stalls the reasoning loop.

use serde::{Deserialize, Serialize};

/// A source reference extracted opportunistically from a tool payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub description: String,
}

/// The normalized result of one tool call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedResponse {
    /// Whether the tool call succeeded.
    pub success: bool,

    /// Human-readable output, formatted for the model. Never empty.
    pub output: String,

    /// Sources extracted from the payload, if any.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<Source>,

    /// Whether this observation describes an error condition.
    pub is_error: bool,

    /// Tool-specific metadata preserved for callers.
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl NormalizedResponse {
    /// A successful observation with readable output.
    pub fn ok(output: impl Into<String>) -> Self {
        let output = output.into();
        debug_assert!(!output.is_empty());
        Self {
            success: true,
            output,
            sources: Vec::new(),
            is_error: false,
            metadata: serde_json::Map::new(),
        }
    }

    /// A failure observation with a human-readable explanation.
    pub fn failure(output: impl Into<String>) -> Self {
        Self {
            success: false,
            output: output.into(),
            sources: Vec::new(),
            is_error: true,
            metadata: serde_json::Map::new(),
        }
    }

    /// The "call succeeded but returned nothing" placeholder.
    pub fn empty_success_placeholder(tool_name: &str) -> Self {
        Self::ok(format!(
            "The {tool_name} call completed successfully but returned no content. \
             Consider refining the input or trying a different approach."
        ))
    }

    pub fn with_sources(mut self, sources: Vec<Source>) -> Self {
        self.sources = sources;
        self
    }

    pub fn with_metadata(mut self, key: &str, value: serde_json::Value) -> Self {
        self.metadata.insert(key.to_string(), value);
        self
    }
}
