//! Query intent classification for smart compression.
//!
//! Keyword + synonym matching over eight coarse intents. Used to bias
//! section selection and to pick contextual examples when the compressed
//! fragment comes in well under budget.

use crate::index::{SynonymMap, tokenize};

/// Coarse classification of what the user is trying to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryIntent {
    Search,
    Visualization,
    DataAnalysis,
    CodeExecution,
    Mathematical,
    TextProcessing,
    ReportGeneration,
    General,
}

impl QueryIntent {
    /// Keywords that vote for this intent.
    fn keywords(&self) -> &'static [&'static str] {
        match self {
            QueryIntent::Search => &["search", "find", "news", "web", "latest", "lookup", "搜索"],
            QueryIntent::Visualization => &["chart", "plot", "graph", "visualize", "diagram", "draw", "图表"],
            QueryIntent::DataAnalysis => &["data", "analyze", "dataset", "statistics", "csv", "trend", "分析"],
            QueryIntent::CodeExecution => &["code", "run", "execute", "python", "script", "sandbox", "代码"],
            QueryIntent::Mathematical => &["math", "calculate", "equation", "solve", "integral", "计算"],
            QueryIntent::TextProcessing => &["summarize", "translate", "rewrite", "extract", "text", "翻译"],
            QueryIntent::ReportGeneration => &["report", "document", "write", "summary", "compile", "报告"],
            QueryIntent::General => &[],
        }
    }

    /// A short usage example matched to the intent, appended when the
    /// compressed output is far under budget.
    pub fn contextual_example(&self) -> Option<&'static str> {
        match self {
            QueryIntent::Search => Some(
                "Example: {\"query\": \"recent developments in topic X\", \"max_results\": 5}",
            ),
            QueryIntent::Visualization => Some(
                "Example: generate the figure with matplotlib and save it to a file before returning.",
            ),
            QueryIntent::DataAnalysis => Some(
                "Example: load the dataset with pandas, then describe() before deeper analysis.",
            ),
            QueryIntent::CodeExecution => Some(
                "Example: {\"code\": \"print(2 + 2)\"} — output is captured from stdout.",
            ),
            QueryIntent::Mathematical => Some(
                "Example: prefer exact symbolic computation; fall back to numeric evaluation.",
            ),
            QueryIntent::TextProcessing => Some(
                "Example: pass the full source text in one call instead of fragmenting it.",
            ),
            QueryIntent::ReportGeneration => Some(
                "Example: structure the report with headings and cite sources inline.",
            ),
            QueryIntent::General => None,
        }
    }
}

const ALL_INTENTS: &[QueryIntent] = &[
    QueryIntent::Search,
    QueryIntent::Visualization,
    QueryIntent::DataAnalysis,
    QueryIntent::CodeExecution,
    QueryIntent::Mathematical,
    QueryIntent::TextProcessing,
    QueryIntent::ReportGeneration,
];

/// Classify a query by keyword votes, expanded through the synonym map.
/// Falls back to `General` when nothing votes.
pub fn classify_intent(query: &str, synonyms: &SynonymMap) -> QueryIntent {
    let tokens = tokenize(query);
    if tokens.is_empty() {
        return QueryIntent::General;
    }

    // Expand tokens through the synonym map once.
    let mut expanded: Vec<String> = tokens.clone();
    for token in &tokens {
        if let Some(alts) = synonyms.get(token.as_str()) {
            expanded.extend(alts.iter().cloned());
        }
    }

    let mut best = QueryIntent::General;
    let mut best_votes = 0usize;
    for intent in ALL_INTENTS {
        let votes = expanded
            .iter()
            .filter(|t| intent.keywords().contains(&t.as_str()))
            .count();
        if votes > best_votes {
            best_votes = votes;
            best = *intent;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::default_synonyms;

    #[test]
    fn classifies_search_queries() {
        let intent = classify_intent("search for the latest AI news", &default_synonyms());
        assert_eq!(intent, QueryIntent::Search);
    }

    #[test]
    fn classifies_visualization_queries() {
        let intent = classify_intent("plot a bar chart of sales", &default_synonyms());
        assert_eq!(intent, QueryIntent::Visualization);
    }

    #[test]
    fn classifies_code_execution_queries() {
        let intent = classify_intent("run this python script", &default_synonyms());
        assert_eq!(intent, QueryIntent::CodeExecution);
    }

    #[test]
    fn unknown_queries_are_general() {
        let intent = classify_intent("zebra yodeling", &default_synonyms());
        assert_eq!(intent, QueryIntent::General);
        assert!(intent.contextual_example().is_none());
    }

    #[test]
    fn synonym_expansion_reaches_intent() {
        // "graph" is a synonym of "chart"; the query itself says "diagram".
        let intent = classify_intent("make a diagram of the data flow", &default_synonyms());
        assert_eq!(intent, QueryIntent::Visualization);
    }
}
