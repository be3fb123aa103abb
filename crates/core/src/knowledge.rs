//! Compressed-knowledge value types shared by the compressor and callers.

use serde::{Deserialize, Serialize};

/// How aggressively a skill document is reduced before injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompressionLevel {
    /// Must-keep excerpt only: call structure, first example, fatal errors.
    Minimal,
    /// Pointer only, no body content — for already-injected tools.
    Reference,
    /// Query-adaptive section selection on top of the minimal excerpt.
    Smart,
}

/// Level selector passed by callers; `Auto` resolves by source size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LevelChoice {
    #[default]
    Auto,
    Minimal,
    Reference,
    Smart,
}

/// A token-budget-bounded context fragment produced from a skill document.
///
/// Invariant: `compressed_length ≤ max_chars` for the requested budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressedKnowledge {
    pub content: String,
    pub source_length: usize,
    pub compressed_length: usize,
    pub level: CompressionLevel,
}
