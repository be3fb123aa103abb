//! Knowledge federation — lazy resolution of a skill document's auxiliary
//! references.
//!
//! A document may name other catalog documents whose sections extend the
//! primary guide. Resolution happens on request, never at catalog load, and
//! missing references are skipped rather than treated as errors.

use std::sync::Arc;

use skillforge_core::{SkillCatalog, SkillDocument};
use tracing::debug;

/// Resolves referenced documents against the catalog and concatenates
/// primary content with the named reference sections.
pub struct KnowledgeFederation {
    catalog: Arc<SkillCatalog>,
}

impl KnowledgeFederation {
    pub fn new(catalog: Arc<SkillCatalog>) -> Self {
        Self { catalog }
    }

    /// The document's full text with each resolvable reference appended as
    /// its own titled section.
    pub fn federated_text(&self, doc: &SkillDocument) -> String {
        if doc.referenced_documents.is_empty() {
            return doc.full_text.clone();
        }

        let mut out = doc.full_text.clone();
        for reference in &doc.referenced_documents {
            match self.catalog.get(reference) {
                Some(aux) => {
                    out.push_str(&format!("\n\n# Reference: {}\n", aux.name));
                    out.push_str(&aux.full_text);
                }
                None => {
                    debug!(tool = %doc.tool_name, reference = %reference, "Skipping unresolved reference");
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(tool: &str, text: &str, refs: &[&str]) -> SkillDocument {
        SkillDocument {
            tool_name: tool.into(),
            name: tool.into(),
            description: String::new(),
            category: String::new(),
            tags: vec![],
            priority: 0,
            version: "1".into(),
            referenced_documents: refs.iter().map(|r| r.to_string()).collect(),
            full_text: text.into(),
        }
    }

    #[test]
    fn concatenates_resolvable_references() {
        let catalog = Arc::new(SkillCatalog::from_documents(vec![
            doc("search", "primary guide", &["search_advanced"]),
            doc("search_advanced", "advanced patterns", &[]),
        ]));
        let federation = KnowledgeFederation::new(catalog.clone());

        let text = federation.federated_text(catalog.get("search").unwrap());
        assert!(text.starts_with("primary guide"));
        assert!(text.contains("# Reference: search_advanced"));
        assert!(text.contains("advanced patterns"));
    }

    #[test]
    fn missing_references_are_skipped() {
        let catalog = Arc::new(SkillCatalog::from_documents(vec![doc(
            "search",
            "primary guide",
            &["ghost"],
        )]));
        let federation = KnowledgeFederation::new(catalog.clone());

        let text = federation.federated_text(catalog.get("search").unwrap());
        assert_eq!(text, "primary guide");
    }

    #[test]
    fn no_references_returns_primary_unchanged() {
        let catalog = Arc::new(SkillCatalog::from_documents(vec![doc("search", "primary", &[])]));
        let federation = KnowledgeFederation::new(catalog.clone());
        assert_eq!(federation.federated_text(catalog.get("search").unwrap()), "primary");
    }
}
