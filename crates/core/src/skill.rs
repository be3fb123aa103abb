//! Skill documents — the stored usage guide + metadata for one tool.
//!
//! A `SkillDocument` is loaded once at catalog-load time and never mutated
//! at runtime. The catalog is the read-mostly registry shared by all
//! concurrent agent runs.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::error::SkillError;

/// The stored usage guide and metadata for one tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillDocument {
    /// Unique key: the tool this guide documents (e.g. "tavily_search").
    pub tool_name: String,

    /// Human-readable skill name.
    pub name: String,

    /// One-line description, shown in the agent's tool catalog.
    pub description: String,

    /// Category used for hint matching (e.g. "search", "code_execution").
    #[serde(default)]
    pub category: String,

    /// Free-form tags used by the relevance matcher.
    #[serde(default)]
    pub tags: Vec<String>,

    /// Priority 0–10; feeds into the relevance score.
    #[serde(default)]
    pub priority: u8,

    /// Document version; part of the cache key.
    #[serde(default = "default_version")]
    pub version: String,

    /// Names of auxiliary documents resolved by the knowledge federation.
    #[serde(default)]
    pub referenced_documents: Vec<String>,

    /// The complete usage guide body.
    pub full_text: String,
}

fn default_version() -> String {
    "1".into()
}

/// A scored candidate from the relevance matcher.
///
/// Derived per query, never stored. Returned lists are sorted descending by
/// score and capped to a small top-N.
#[derive(Debug, Clone)]
pub struct RelevanceMatch {
    pub tool_name: String,
    /// Relevance in [0, 1].
    pub score: f32,
    pub document: SkillDocument,
}

/// The static registry mapping tool name → skill document.
///
/// Loaded once at startup; afterwards read-only.
#[derive(Debug, Default)]
pub struct SkillCatalog {
    documents: HashMap<String, SkillDocument>,
    /// Catalog iteration order — used for stable tie-breaking during scoring.
    order: Vec<String>,
}

impl SkillCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from pre-constructed documents.
    pub fn from_documents(docs: Vec<SkillDocument>) -> Self {
        let mut catalog = Self::new();
        for doc in docs {
            catalog.insert(doc);
        }
        catalog
    }

    /// Load every `*.md` skill file in a directory.
    ///
    /// Each file carries a `---` front-matter header (simple `key: value`
    /// lines) followed by the guide body.
    pub fn load_dir(dir: &Path) -> Result<Self, SkillError> {
        let mut catalog = Self::new();
        let entries = std::fs::read_dir(dir)
            .map_err(|e| SkillError::Catalog(format!("cannot read {}: {e}", dir.display())))?;

        let mut paths: Vec<_> = entries
            .filter_map(|e| e.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "md"))
            .collect();
        paths.sort();

        for path in paths {
            let raw = std::fs::read_to_string(&path)
                .map_err(|e| SkillError::Catalog(format!("cannot read {}: {e}", path.display())))?;
            match parse_skill_file(&raw) {
                Ok(doc) => {
                    tracing::debug!(tool = %doc.tool_name, file = %path.display(), "Loaded skill document");
                    catalog.insert(doc);
                }
                Err(e) => {
                    tracing::warn!(file = %path.display(), error = %e, "Skipping malformed skill file");
                }
            }
        }

        Ok(catalog)
    }

    /// Insert a document. Replaces any existing document for the same tool.
    pub fn insert(&mut self, doc: SkillDocument) {
        if !self.documents.contains_key(&doc.tool_name) {
            self.order.push(doc.tool_name.clone());
        }
        self.documents.insert(doc.tool_name.clone(), doc);
    }

    pub fn get(&self, tool_name: &str) -> Option<&SkillDocument> {
        self.documents.get(tool_name)
    }

    /// Documents in stable catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &SkillDocument> {
        self.order.iter().filter_map(|name| self.documents.get(name))
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// All registered tool names in catalog order.
    pub fn tool_names(&self) -> Vec<&str> {
        self.order.iter().map(|s| s.as_str()).collect()
    }
}

/// Parse one skill file: `---` front-matter followed by the guide body.
fn parse_skill_file(raw: &str) -> Result<SkillDocument, SkillError> {
    let rest = raw
        .strip_prefix("---")
        .ok_or_else(|| SkillError::Catalog("missing front-matter opener".into()))?;
    let end = rest
        .find("\n---")
        .ok_or_else(|| SkillError::Catalog("missing front-matter closer".into()))?;
    let header = &rest[..end];
    let body = rest[end + 4..].trim_start_matches('\n');

    let mut tool_name = String::new();
    let mut name = String::new();
    let mut description = String::new();
    let mut category = String::new();
    let mut tags = Vec::new();
    let mut priority = 0u8;
    let mut version = default_version();
    let mut referenced = Vec::new();

    for line in header.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        match key.trim() {
            "tool_name" => tool_name = value.to_string(),
            "name" => name = value.to_string(),
            "description" => description = value.to_string(),
            "category" => category = value.to_string(),
            "tags" => {
                tags = value
                    .split(',')
                    .map(|t| t.trim().to_string())
                    .filter(|t| !t.is_empty())
                    .collect();
            }
            "priority" => priority = value.parse().unwrap_or(0),
            "version" => version = value.to_string(),
            "references" => {
                referenced = value
                    .split(',')
                    .map(|t| t.trim().to_string())
                    .filter(|t| !t.is_empty())
                    .collect();
            }
            _ => {}
        }
    }

    if tool_name.is_empty() {
        return Err(SkillError::Catalog("front-matter missing tool_name".into()));
    }
    if name.is_empty() {
        name = tool_name.clone();
    }

    Ok(SkillDocument {
        tool_name,
        name,
        description,
        category,
        tags,
        priority,
        version,
        referenced_documents: referenced,
        full_text: body.to_string(),
    })
}
