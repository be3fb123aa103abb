//! KnowledgeCompressor — reduces a skill document to a budget-bounded
//! context fragment.
//!
//! Three levels (glossary): `minimal` keeps only must-keep regions,
//! `reference` emits a pointer with no body content, and `smart` layers
//! query-adaptive section selection on top of the minimal excerpt. `Auto`
//! resolves a level from the source size. Output never exceeds the
//! character budget; a fragment still over budget after extraction is
//! hard-truncated with an ellipsis marker.
//!
//! Every call is quality-scored; low-quality fragments are logged for later
//! tuning but never block the call.

use std::sync::atomic::{AtomicUsize, Ordering};

use skillforge_core::{CompressedKnowledge, CompressionLevel, LevelChoice};
use tracing::{debug, warn};

use crate::index::{SynonymMap, default_synonyms, tokenize};
use crate::intent::{QueryIntent, classify_intent};
use crate::sections::{Section, first_json_block, split_sections};

/// Auto-level threshold: above this the source gets the minimal treatment.
const AUTO_MINIMAL_THRESHOLD: usize = 30_000;
/// Auto-level threshold: above this (and below minimal) use smart.
const AUTO_SMART_THRESHOLD: usize = 10_000;

/// Target size of a minimal extraction, in characters.
const MINIMAL_TARGET: usize = 1_600;
/// Must-keep regions may run up to 1.5× the minimal target.
const MINIMAL_CAP_FACTOR: f64 = 1.5;

/// Smart extraction appends at most this many scored sections.
const SMART_MAX_SECTIONS: usize = 2;
/// Below this fraction of budget, smart extraction appends contextual examples.
const SMART_FILL_THRESHOLD: f64 = 0.4;

/// Fragments scoring below this are logged as low quality.
const QUALITY_FLOOR: f32 = 0.6;

/// Heading patterns for the canonical call-structure region.
const CALL_STRUCTURE_MARKERS: &[&str] = &["call structure", "canonical call", "调用结构"];
/// Heading patterns for the fatal-errors region.
const FATAL_ERROR_MARKERS: &[&str] = &["fatal error", "common errors", "致命错误", "常见错误"];
/// Heading patterns for the key-instructions region.
const KEY_INSTRUCTION_MARKERS: &[&str] = &["key instruction", "important", "关键指令", "注意事项"];

/// Options for one compression call.
#[derive(Debug, Clone)]
pub struct CompressOptions {
    pub level: LevelChoice,
    pub max_chars: usize,
    /// Query text driving smart section selection. May be empty.
    pub query: String,
}

impl CompressOptions {
    pub fn auto(max_chars: usize, query: impl Into<String>) -> Self {
        Self {
            level: LevelChoice::Auto,
            max_chars,
            query: query.into(),
        }
    }
}

/// The compressor. Stateless apart from quality counters — create one and
/// share it across sessions.
pub struct KnowledgeCompressor {
    synonyms: SynonymMap,
    calls: AtomicUsize,
    low_quality_calls: AtomicUsize,
}

impl Default for KnowledgeCompressor {
    fn default() -> Self {
        Self::new()
    }
}

impl KnowledgeCompressor {
    pub fn new() -> Self {
        Self {
            synonyms: default_synonyms(),
            calls: AtomicUsize::new(0),
            low_quality_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_synonyms(mut self, synonyms: SynonymMap) -> Self {
        self.synonyms = synonyms;
        self
    }

    /// Total compress calls made.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    /// Calls whose output scored below the quality floor.
    pub fn low_quality_count(&self) -> usize {
        self.low_quality_calls.load(Ordering::Relaxed)
    }

    /// Compress `full_text` to at most `max_chars` characters.
    ///
    /// A source already within budget is returned unchanged, byte for byte;
    /// the resolved level is still recorded for quality tracking.
    pub fn compress(&self, full_text: &str, opts: &CompressOptions) -> CompressedKnowledge {
        self.calls.fetch_add(1, Ordering::Relaxed);

        let source_length = full_text.chars().count();
        let level = resolve_level(opts.level, source_length);

        let content = if source_length <= opts.max_chars {
            full_text.to_string()
        } else {
            let extracted = match level {
                CompressionLevel::Minimal => self.minimal_extract(full_text, opts.max_chars),
                CompressionLevel::Reference => reference_summary(full_text),
                CompressionLevel::Smart => self.smart_extract(full_text, &opts.query, opts.max_chars),
            };
            truncate_chars(&extracted, opts.max_chars)
        };

        let quality = quality_score(&content);
        if quality < QUALITY_FLOOR {
            self.low_quality_calls.fetch_add(1, Ordering::Relaxed);
            warn!(
                quality,
                level = ?level,
                source_length,
                "Low-quality compressed fragment"
            );
        } else {
            debug!(quality, level = ?level, source_length, "Compressed skill document");
        }

        CompressedKnowledge {
            compressed_length: content.chars().count(),
            content,
            source_length,
            level,
        }
    }

    /// Extract only the must-keep regions: the canonical call-structure
    /// block, the first JSON example, the fatal-errors block, and the
    /// key-instructions block. Falls back to a raw prefix when nothing
    /// matched.
    fn minimal_extract(&self, text: &str, max_chars: usize) -> String {
        let cap = ((MINIMAL_TARGET as f64 * MINIMAL_CAP_FACTOR) as usize).min(max_chars);
        let sections = split_sections(text);

        let mut out = String::new();
        let mut picked_json = false;

        for markers in [CALL_STRUCTURE_MARKERS, FATAL_ERROR_MARKERS, KEY_INSTRUCTION_MARKERS] {
            if let Some(section) = find_section(&sections, markers) {
                append_bounded(&mut out, &section.content, cap);
                picked_json = picked_json || section.has_code();
            }
        }

        // The first JSON example, unless a picked region already carried one.
        if !picked_json
            && let Some(block) = first_json_block(text)
        {
            append_bounded(&mut out, &block, cap);
        }

        if out.trim().is_empty() {
            // Nothing matched the must-keep patterns: take a raw prefix.
            return truncate_chars(text, MINIMAL_TARGET.min(max_chars));
        }
        out
    }

    /// Query-adaptive extraction: minimal excerpt, then the highest-scoring
    /// code-bearing sections, then contextual examples if far under budget.
    fn smart_extract(&self, text: &str, query: &str, max_chars: usize) -> String {
        let mut out = self.minimal_extract(text, max_chars);

        let intent = classify_intent(query, &self.synonyms);
        let sections = split_sections(text);
        let mut scored = score_sections(&sections, query, intent, &self.synonyms);
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        // Append up to two code-bearing sections, whole or not at all: a
        // fenced block is never split.
        let mut appended = 0;
        for (score, section) in &scored {
            if appended >= SMART_MAX_SECTIONS || *score <= 0.0 {
                break;
            }
            if !section.has_code() || out.contains(section.content.trim()) {
                continue;
            }
            if out.chars().count() + section.char_len() + 1 <= max_chars {
                out.push('\n');
                out.push_str(&section.content);
                appended += 1;
            }
        }

        // Under 40% of budget: pad with an example matched to the intent.
        if (out.chars().count() as f64) < max_chars as f64 * SMART_FILL_THRESHOLD
            && let Some(example) = intent.contextual_example()
        {
            out.push('\n');
            out.push_str(example);
        }

        out
    }
}

/// Resolve an `Auto` choice by source size.
fn resolve_level(choice: LevelChoice, source_length: usize) -> CompressionLevel {
    match choice {
        LevelChoice::Minimal => CompressionLevel::Minimal,
        LevelChoice::Reference => CompressionLevel::Reference,
        LevelChoice::Smart => CompressionLevel::Smart,
        LevelChoice::Auto => {
            if source_length > AUTO_MINIMAL_THRESHOLD {
                CompressionLevel::Minimal
            } else if source_length > AUTO_SMART_THRESHOLD {
                CompressionLevel::Smart
            } else {
                CompressionLevel::Reference
            }
        }
    }
}

/// Pointer-only rendering for already-injected tools: the top headings plus
/// a note that the full guide was provided earlier in the session.
fn reference_summary(text: &str) -> String {
    let sections = split_sections(text);
    let headings: Vec<&str> = sections
        .iter()
        .filter(|s| !s.title.is_empty())
        .take(3)
        .map(|s| s.title.as_str())
        .collect();

    let mut out = String::from(
        "The full usage guide for this tool was already provided earlier in this session.\n",
    );
    if !headings.is_empty() {
        out.push_str("Key sections: ");
        out.push_str(&headings.join(", "));
        out.push('.');
    }
    out
}

fn find_section<'a>(sections: &'a [Section], markers: &[&str]) -> Option<&'a Section> {
    sections.iter().find(|s| {
        let title = s.title.to_lowercase();
        markers.iter().any(|m| title.contains(m))
    })
}

fn append_bounded(out: &mut String, addition: &str, cap: usize) {
    let used = out.chars().count();
    if used >= cap {
        return;
    }
    let remaining = cap - used;
    if addition.chars().count() <= remaining {
        out.push_str(addition);
        out.push('\n');
    } else {
        out.push_str(&truncate_chars(addition, remaining));
    }
}

/// Score sections by keyword overlap, title bonus, synonym bonus, and an
/// intent-specific bonus.
fn score_sections<'a>(
    sections: &'a [Section],
    query: &str,
    intent: QueryIntent,
    synonyms: &SynonymMap,
) -> Vec<(f64, &'a Section)> {
    let tokens = tokenize(query);
    let intent_keywords: Vec<&str> = match intent {
        QueryIntent::General => vec![],
        _ => {
            // The intent's own vocabulary votes on sections too.
            let mut kw = tokens.iter().map(|t| t.as_str()).collect::<Vec<_>>();
            kw.extend(intent_section_markers(intent));
            kw
        }
    };

    sections
        .iter()
        .map(|section| {
            let content_lower = section.content.to_lowercase();
            let title_lower = section.title.to_lowercase();
            let mut score = 0.0f64;

            for token in &tokens {
                if content_lower.contains(token.as_str()) {
                    score += 1.0;
                }
                if !title_lower.is_empty() && title_lower.contains(token.as_str()) {
                    score += 3.0;
                }
                if let Some(alts) = synonyms.get(token.as_str()) {
                    score += alts
                        .iter()
                        .filter(|alt| content_lower.contains(alt.as_str()))
                        .count() as f64
                        * 0.5;
                }
            }

            if intent != QueryIntent::General
                && intent_keywords.iter().any(|kw| {
                    title_lower.contains(kw) || content_lower.contains(kw)
                })
            {
                score += 5.0;
            }

            (score, section)
        })
        .collect()
}

/// Section-title vocabulary associated with each intent.
fn intent_section_markers(intent: QueryIntent) -> &'static [&'static str] {
    match intent {
        QueryIntent::Search => &["search", "query", "result"],
        QueryIntent::Visualization => &["chart", "plot", "visual", "figure"],
        QueryIntent::DataAnalysis => &["data", "analysis", "pandas"],
        QueryIntent::CodeExecution => &["code", "execute", "sandbox"],
        QueryIntent::Mathematical => &["math", "calculation", "formula"],
        QueryIntent::TextProcessing => &["text", "string", "format"],
        QueryIntent::ReportGeneration => &["report", "output", "structure"],
        QueryIntent::General => &[],
    }
}

/// 0–1 quality heuristic over a compressed fragment.
pub fn quality_score(content: &str) -> f32 {
    let lower = content.to_lowercase();
    let mut score = 0.0f32;

    if CALL_STRUCTURE_MARKERS.iter().any(|m| lower.contains(m)) {
        score += 0.3;
    }
    if content.contains("```json") {
        score += 0.25;
    }
    if lower.contains("parameter") || lower.contains("参数") {
        score += 0.15;
    }
    let len = content.chars().count();
    if (200..=5000).contains(&len) {
        score += 0.1;
    }
    if content.lines().any(|l| l.trim_start().starts_with('#')) {
        score += 0.1;
    }
    if !content.trim_end().ends_with('…') {
        score += 0.1;
    }
    score
}

/// Truncate to at most `max_chars` characters, appending an ellipsis marker
/// when content had to be cut. Safe on any char boundary.
fn truncate_chars(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    if max_chars == 0 {
        return String::new();
    }
    let mut out: String = s.chars().take(max_chars - 1).collect();
    out.push('…');
    out
}
