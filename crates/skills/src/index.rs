//! SkillIndex — lexical relevance matching of skill documents to a query.
//!
//! Matching is deliberately lexical/heuristic: tokenize the query, expand
//! through a synonym map, and score each candidate with a weighted sum of
//! name mentions, keyword hits, synonym hits, category hints, and document
//! priority. No embeddings, no side effects — a pure function of the query
//! and the static catalog.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use skillforge_core::{QueryContext, RelevanceMatch, SkillCatalog};
use tracing::debug;

/// Maximum matches returned per query.
const TOP_N: usize = 3;
/// Matches scoring below this are dropped.
const SCORE_THRESHOLD: f32 = 0.15;
/// At most this many synonym hits count per query token.
const SYNONYM_HIT_CAP: usize = 3;
/// Overall scale applied to the synonym term.
const SYNONYM_SCALE: f32 = 0.3;

/// Verbs that signal a strong tool intent; hits on these score higher.
const CORE_VERBS: &[&str] = &[
    "extract", "scrape", "search", "crawl", "execute", "run", "generate", "analyze", "plot",
];

const STOP_WORDS: &[&str] = &[
    "a", "an", "the", "is", "are", "was", "were", "be", "been", "to", "of", "in", "on", "for",
    "and", "or", "but", "with", "about", "as", "at", "by", "from", "that", "this", "it", "its",
    "me", "my", "i", "you", "your", "we", "our", "do", "does", "can", "could", "would", "should",
    "please", "how", "what", "into", "latest", "some",
    // common Chinese function words
    "的", "了", "和", "是", "我", "你", "请", "把", "给",
];

/// Configurable map from a token to the alternatives it also matches.
pub type SynonymMap = HashMap<String, Vec<String>>;

/// The default synonym map covering the built-in tool vocabulary.
pub fn default_synonyms() -> SynonymMap {
    let entries: &[(&str, &[&str])] = &[
        ("search", &["find", "lookup", "query", "research", "搜索"]),
        ("find", &["search", "lookup"]),
        ("scrape", &["crawl", "extract", "fetch"]),
        ("crawl", &["scrape", "fetch", "browse"]),
        ("code", &["python", "script", "program"]),
        ("execute", &["run", "eval", "compute"]),
        ("chart", &["plot", "graph", "visualization", "diagram"]),
        ("image", &["picture", "photo", "draw", "illustration"]),
        ("chess", &["board", "move", "position", "engine"]),
        ("analyze", &["analysis", "evaluate", "assess"]),
    ];
    entries
        .iter()
        .map(|(k, vs)| (k.to_string(), vs.iter().map(|v| v.to_string()).collect()))
        .collect()
}

/// The relevance matcher over a static skill catalog.
pub struct SkillIndex {
    catalog: Arc<SkillCatalog>,
    synonyms: SynonymMap,
}

impl SkillIndex {
    pub fn new(catalog: Arc<SkillCatalog>) -> Self {
        Self {
            catalog,
            synonyms: default_synonyms(),
        }
    }

    /// Replace the synonym map (e.g. from configuration).
    pub fn with_synonyms(mut self, synonyms: SynonymMap) -> Self {
        self.synonyms = synonyms;
        self
    }

    pub fn catalog(&self) -> &SkillCatalog {
        &self.catalog
    }

    /// Score every candidate document against the query.
    ///
    /// Returns at most three matches, sorted descending by score, all above
    /// the 0.15 threshold. Documents outside `available_tools` (when
    /// non-empty) are excluded before scoring. Ties keep catalog order.
    pub fn match_query(&self, context: &QueryContext) -> Vec<RelevanceMatch> {
        let tokens = tokenize(&context.text);
        if tokens.is_empty() && context.category_hint.is_none() {
            return Vec::new();
        }
        let query_lower = context.text.to_lowercase();

        let mut matches: Vec<RelevanceMatch> = self
            .catalog
            .iter()
            .filter(|doc| {
                context.available_tools.is_empty()
                    || context.available_tools.iter().any(|t| t == &doc.tool_name)
            })
            .filter_map(|doc| {
                let score = self.score_document(doc, &query_lower, &tokens, context);
                (score >= SCORE_THRESHOLD).then(|| RelevanceMatch {
                    tool_name: doc.tool_name.clone(),
                    score,
                    document: doc.clone(),
                })
            })
            .collect();

        // Stable sort: ties keep catalog iteration order.
        matches.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        matches.truncate(TOP_N);

        debug!(
            query = %context.text,
            matched = matches.len(),
            "Skill relevance matching complete"
        );
        matches
    }

    fn score_document(
        &self,
        doc: &skillforge_core::SkillDocument,
        query_lower: &str,
        tokens: &[String],
        context: &QueryContext,
    ) -> f32 {
        let mut score = 0.0f32;

        // Exact tool-name or alias mention is the strongest signal.
        let name_lower = doc.name.to_lowercase();
        let tool_spaced = doc.tool_name.replace('_', " ");
        if query_lower.contains(&doc.tool_name)
            || query_lower.contains(&tool_spaced)
            || (!name_lower.is_empty() && query_lower.contains(&name_lower))
        {
            score += 0.6;
        }

        let haystack = format!(
            "{} {} {}",
            doc.name.to_lowercase(),
            doc.description.to_lowercase(),
            doc.full_text.to_lowercase()
        );
        let tags_lower: Vec<String> = doc.tags.iter().map(|t| t.to_lowercase()).collect();

        let mut synonym_term = 0.0f32;
        for token in tokens {
            let in_tags = tags_lower.iter().any(|t| t.contains(token.as_str()));
            let in_body = haystack.contains(token.as_str());

            if in_tags || in_body {
                // Per-keyword weight: tag hits beat body hits, core verbs
                // beat both.
                let weight = if CORE_VERBS.contains(&token.as_str()) {
                    0.2
                } else if in_tags {
                    0.15
                } else {
                    0.1
                };
                score += weight;
            }

            // Synonym expansion: capped per token, scaled overall.
            if let Some(alts) = self.synonyms.get(token.as_str()) {
                let hits = alts
                    .iter()
                    .filter(|alt| {
                        haystack.contains(alt.as_str())
                            || tags_lower.iter().any(|t| t.contains(alt.as_str()))
                    })
                    .take(SYNONYM_HIT_CAP)
                    .count();
                synonym_term += hits as f32 * 0.1;
            }
        }
        score += synonym_term * SYNONYM_SCALE;

        // Category hint from the caller.
        if let Some(hint) = &context.category_hint
            && !doc.category.is_empty()
            && doc.category.eq_ignore_ascii_case(hint)
        {
            score += 0.25;
        }

        // Priority nudges frequently-useful tools upward.
        score += (doc.priority as f32 / 10.0) * 0.15;

        score.clamp(0.0, 1.0)
    }
}

fn is_cjk(c: char) -> bool {
    matches!(c,
        '\u{4e00}'..='\u{9fff}'
        | '\u{3400}'..='\u{4dbf}'
        | '\u{3040}'..='\u{30ff}'
        | '\u{ac00}'..='\u{d7af}')
}

/// Tokenize a query: strip URLs, split on non-alphanumeric/non-CJK
/// boundaries, drop stop words and single ASCII characters.
///
/// CJK characters are kept as single-character tokens since there are no
/// whitespace boundaries to split on.
pub fn tokenize(text: &str) -> Vec<String> {
    let mut tokens: Vec<String> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for word in text.split_whitespace() {
        if word.starts_with("http://") || word.starts_with("https://") || word.starts_with("www.") {
            continue;
        }
        let mut current = String::new();
        let mut flush = |current: &mut String, tokens: &mut Vec<String>, seen: &mut HashSet<String>| {
            if current.is_empty() {
                return;
            }
            let token = std::mem::take(current).to_lowercase();
            if token.chars().count() < 2 && token.is_ascii() {
                return;
            }
            if STOP_WORDS.contains(&token.as_str()) {
                return;
            }
            if seen.insert(token.clone()) {
                tokens.push(token);
            }
        };

        for c in word.chars() {
            if c.is_alphanumeric() && !is_cjk(c) {
                current.push(c);
            } else if is_cjk(c) {
                flush(&mut current, &mut tokens, &mut seen);
                let token = c.to_string();
                if !STOP_WORDS.contains(&token.as_str()) && seen.insert(token.clone()) {
                    tokens.push(token);
                }
            } else {
                flush(&mut current, &mut tokens, &mut seen);
            }
        }
        flush(&mut current, &mut tokens, &mut seen);
    }

    tokens
}
