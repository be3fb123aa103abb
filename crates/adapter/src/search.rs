//! Normalizer for the `tavily_search` web search tool.

use serde_json::{json, Value};
use skillforge_core::{InvocationMode, NormalizedResponse, ResearchMode, Source};

use crate::normalize::{coerce_object, merge_defaults, precheck, ToolNormalizer, ToolTimeoutClass};
use crate::profiles;

pub struct SearchNormalizer;

impl ToolNormalizer for SearchNormalizer {
    fn tool_name(&self) -> &str {
        "tavily_search"
    }

    fn timeout_class(&self) -> ToolTimeoutClass {
        ToolTimeoutClass::Network
    }

    fn normalize_request(&self, raw: Value, _mode: InvocationMode, research: ResearchMode) -> Value {
        let mut params = coerce_object(raw, "query");

        // Models sometimes emit a `queries` array; coalesce to one string.
        if !params.contains_key("query")
            && let Some(queries) = params.remove("queries")
        {
            let query = match queries {
                Value::Array(items) => items
                    .iter()
                    .filter_map(Value::as_str)
                    .collect::<Vec<_>>()
                    .join(" "),
                Value::String(s) => s,
                other => other.to_string(),
            };
            params.insert("query".into(), json!(query));
        }

        merge_defaults(&mut params, profiles::search_defaults(research));
        Value::Object(params)
    }

    fn normalize_response(
        &self,
        raw: Option<Value>,
        _mode: InvocationMode,
        _research: ResearchMode,
    ) -> NormalizedResponse {
        let value = match precheck(self.tool_name(), raw) {
            Ok(v) => v,
            Err(failure) => return failure,
        };

        let results = value
            .get("results")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        if results.is_empty() {
            // A direct answer with no result list still counts as content.
            if let Some(answer) = value.get("answer").and_then(Value::as_str)
                && !answer.trim().is_empty()
            {
                return NormalizedResponse::ok(answer.to_string());
            }
            return NormalizedResponse::empty_success_placeholder(self.tool_name());
        }

        let mut lines = Vec::with_capacity(results.len() + 1);
        if let Some(answer) = value.get("answer").and_then(Value::as_str)
            && !answer.trim().is_empty()
        {
            lines.push(format!("Answer: {answer}\n"));
        }

        let mut sources = Vec::with_capacity(results.len());
        for (i, result) in results.iter().enumerate() {
            let title = result
                .get("title")
                .and_then(Value::as_str)
                .unwrap_or("(untitled)");
            let url = result.get("url").and_then(Value::as_str).unwrap_or("");
            let snippet = result
                .get("content")
                .or_else(|| result.get("snippet"))
                .and_then(Value::as_str)
                .unwrap_or("");

            lines.push(format!("{}. {title}\n   {url}\n   {snippet}", i + 1));
            sources.push(Source {
                title: title.to_string(),
                url: url.to_string(),
                description: snippet.to_string(),
            });
        }

        NormalizedResponse::ok(lines.join("\n")).with_sources(sources)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn normalize(raw: Value) -> Value {
        SearchNormalizer.normalize_request(raw, InvocationMode::Agent, ResearchMode::Standard)
    }

    #[test]
    fn stray_string_becomes_query() {
        let req = normalize(json!("latest AI chip announcements"));
        assert_eq!(req["query"], json!("latest AI chip announcements"));
        assert_eq!(req["max_results"], json!(5));
    }

    #[test]
    fn queries_array_is_coalesced() {
        let req = normalize(json!({"queries": ["rust async", "tokio runtime"]}));
        assert_eq!(req["query"], json!("rust async tokio runtime"));
    }

    #[test]
    fn caller_max_results_wins_over_profile() {
        let req = SearchNormalizer.normalize_request(
            json!({"query": "x", "max_results": 2}),
            InvocationMode::Agent,
            ResearchMode::Deep,
        );
        assert_eq!(req["max_results"], json!(2));
        assert_eq!(req["search_depth"], json!("advanced"));
    }

    #[test]
    fn results_render_numbered_with_sources() {
        let obs = SearchNormalizer.normalize_response(
            Some(json!({
                "results": [
                    {"title": "Chip news", "url": "https://a.example", "content": "new silicon"},
                    {"title": "More chips", "url": "https://b.example", "content": "faster"}
                ]
            })),
            InvocationMode::Agent,
            ResearchMode::Standard,
        );
        assert!(obs.success);
        assert!(obs.output.starts_with("1. Chip news"));
        assert_eq!(obs.sources.len(), 2);
        assert_eq!(obs.sources[0].url, "https://a.example");
    }

    #[test]
    fn empty_results_yield_placeholder_not_empty_output() {
        let obs = SearchNormalizer.normalize_response(
            Some(json!({"results": []})),
            InvocationMode::Agent,
            ResearchMode::Standard,
        );
        assert!(obs.success);
        assert!(!obs.output.is_empty());
    }
}
