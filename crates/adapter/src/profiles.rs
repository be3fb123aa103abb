//! Research-mode parameter profiles.
//!
//! Each research mode carries a defaults table per tool; caller-supplied
//! values always win, defaults fill only the gaps.

use serde_json::{json, Map, Value};
use skillforge_core::ResearchMode;

/// Default search parameters for a research mode.
pub fn search_defaults(mode: ResearchMode) -> Map<String, Value> {
    let (max_results, depth) = match mode {
        ResearchMode::Standard => (5, "basic"),
        ResearchMode::Deep => (10, "advanced"),
        ResearchMode::Academic => (8, "advanced"),
        ResearchMode::Technical => (8, "advanced"),
    };
    let mut map = Map::new();
    map.insert("max_results".into(), json!(max_results));
    map.insert("search_depth".into(), json!(depth));
    if matches!(mode, ResearchMode::Academic) {
        map.insert("include_domains".into(), json!(["arxiv.org", "scholar.google.com"]));
    }
    map
}

/// Default crawl parameters for a research mode.
pub fn crawl_defaults(mode: ResearchMode) -> Map<String, Value> {
    let (max_pages, extract_depth) = match mode {
        ResearchMode::Standard => (3, "basic"),
        ResearchMode::Deep => (10, "advanced"),
        ResearchMode::Academic => (6, "advanced"),
        ResearchMode::Technical => (6, "advanced"),
    };
    let mut map = Map::new();
    map.insert("max_pages".into(), json!(max_pages));
    map.insert("extract_depth".into(), json!(extract_depth));
    map
}

/// Default sandbox parameters shared by every mode; only the time limit
/// scales with the mode's timeout factor.
pub fn sandbox_defaults(mode: ResearchMode) -> Map<String, Value> {
    let limit = (30.0 * mode.timeout_factor()).round() as u64;
    let mut map = Map::new();
    map.insert("time_limit_secs".into(), json!(limit));
    map
}

/// Default image-generation parameters.
pub fn image_defaults(mode: ResearchMode) -> Map<String, Value> {
    let size = match mode {
        ResearchMode::Deep => "1536x1024",
        _ => "1024x1024",
    };
    let mut map = Map::new();
    map.insert("size".into(), json!(size));
    map.insert("n".into(), json!(1));
    map
}

/// Default chess-engine analysis parameters.
pub fn chess_defaults(mode: ResearchMode) -> Map<String, Value> {
    let depth = match mode {
        ResearchMode::Standard => 12,
        ResearchMode::Deep => 22,
        ResearchMode::Academic | ResearchMode::Technical => 18,
    };
    let mut map = Map::new();
    map.insert("depth".into(), json!(depth));
    map
}
