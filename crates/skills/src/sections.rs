//! Markdown section segmentation for knowledge compression.
//!
//! A section is a heading line plus everything up to the next heading.
//! Headings inside fenced code blocks do not start a new section, so a
//! fenced block is never split across sections.

/// One headered block of a skill document.
#[derive(Debug, Clone)]
pub struct Section {
    /// Heading text without the leading `#` markers. Empty for the preamble.
    pub title: String,
    /// Full section text including the heading line.
    pub content: String,
}

impl Section {
    /// Whether the section carries at least one fenced code block.
    pub fn has_code(&self) -> bool {
        self.content.contains("```")
    }

    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }
}

/// Split a document into headered sections, fence-aware.
///
/// Content before the first heading becomes an untitled preamble section.
pub fn split_sections(text: &str) -> Vec<Section> {
    let mut sections: Vec<Section> = Vec::new();
    let mut title = String::new();
    let mut buf = String::new();
    let mut in_fence = false;

    for line in text.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("```") {
            in_fence = !in_fence;
        }

        if !in_fence && trimmed.starts_with('#') {
            if !buf.trim().is_empty() {
                sections.push(Section {
                    title: std::mem::take(&mut title),
                    content: std::mem::take(&mut buf),
                });
            } else {
                buf.clear();
            }
            title = trimmed.trim_start_matches('#').trim().to_string();
        }

        buf.push_str(line);
        buf.push('\n');
    }

    if !buf.trim().is_empty() {
        sections.push(Section { title, content: buf });
    }

    sections
}

/// Extract the first fenced JSON block, fences included.
pub fn first_json_block(text: &str) -> Option<String> {
    let start = text.find("```json")?;
    let after = &text[start + 7..];
    let end = after.find("```")?;
    Some(format!("```json{}```", &after[..end]))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "intro line\n\n# Call Structure\ncall it like this\n\n## Examples\n```json\n{\"query\": \"x\"}\n```\n\n## Errors\n```\n# not a heading\n```\ntail\n";

    #[test]
    fn splits_on_headings() {
        let sections = split_sections(DOC);
        assert_eq!(sections.len(), 4);
        assert_eq!(sections[0].title, "");
        assert_eq!(sections[1].title, "Call Structure");
        assert_eq!(sections[2].title, "Examples");
        assert_eq!(sections[3].title, "Errors");
    }

    #[test]
    fn heading_inside_fence_does_not_split() {
        let sections = split_sections(DOC);
        let errors = &sections[3];
        assert!(errors.content.contains("# not a heading"));
        assert!(errors.content.contains("tail"));
    }

    #[test]
    fn code_detection() {
        let sections = split_sections(DOC);
        assert!(!sections[1].has_code());
        assert!(sections[2].has_code());
    }

    #[test]
    fn first_json_block_extracted_whole() {
        let block = first_json_block(DOC).unwrap();
        assert!(block.starts_with("```json"));
        assert!(block.contains("\"query\""));
        assert!(block.ends_with("```"));
    }

    #[test]
    fn no_json_block_returns_none() {
        assert!(first_json_block("plain text only").is_none());
    }
}
