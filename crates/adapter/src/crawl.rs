//! Normalizer for the `web_crawler` page extraction tool.

use serde_json::{json, Map, Value};
use skillforge_core::{InvocationMode, NormalizedResponse, ResearchMode, Source};

use crate::normalize::{coerce_object, merge_defaults, precheck, ToolNormalizer, ToolTimeoutClass};
use crate::profiles;

pub struct CrawlNormalizer;

impl ToolNormalizer for CrawlNormalizer {
    fn tool_name(&self) -> &str {
        "web_crawler"
    }

    fn timeout_class(&self) -> ToolTimeoutClass {
        ToolTimeoutClass::Heavy
    }

    fn normalize_request(&self, raw: Value, _mode: InvocationMode, research: ResearchMode) -> Value {
        let mut flat = coerce_object(raw, "url");

        // Already enveloped: merge defaults into the inner parameters.
        if let Some(Value::Object(mut inner)) = flat.remove("parameters") {
            merge_defaults(&mut inner, profiles::crawl_defaults(research));
            let mode = flat
                .remove("mode")
                .unwrap_or_else(|| json!(default_crawl_mode(&inner)));
            let mut envelope = Map::new();
            envelope.insert("mode".into(), mode);
            envelope.insert("parameters".into(), Value::Object(inner));
            return Value::Object(envelope);
        }

        let crawl_mode = flat
            .remove("mode")
            .unwrap_or_else(|| json!(default_crawl_mode(&flat)));
        merge_defaults(&mut flat, profiles::crawl_defaults(research));

        let mut envelope = Map::new();
        envelope.insert("mode".into(), crawl_mode);
        envelope.insert("parameters".into(), Value::Object(flat));
        Value::Object(envelope)
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

        // Single page body.
        if let Some(content) = value
            .get("content")
            .or_else(|| value.get("markdown"))
            .or_else(|| value.get("text"))
            .and_then(Value::as_str)
            && !content.trim().is_empty()
        {
            let mut obs = NormalizedResponse::ok(content.to_string());
            if let Some(url) = value.get("url").and_then(Value::as_str) {
                let title = value.get("title").and_then(Value::as_str).unwrap_or(url);
                obs = obs.with_sources(vec![Source {
                    title: title.to_string(),
                    url: url.to_string(),
                    description: String::new(),
                }]);
            }
            return obs;
        }

        // Multi-page crawl.
        if let Some(pages) = value.get("pages").and_then(Value::as_array)
            && !pages.is_empty()
        {
            let mut parts = Vec::with_capacity(pages.len());
            let mut sources = Vec::with_capacity(pages.len());
            for page in pages {
                let url = page.get("url").and_then(Value::as_str).unwrap_or("");
                let title = page.get("title").and_then(Value::as_str).unwrap_or(url);
                let body = page
                    .get("content")
                    .or_else(|| page.get("markdown"))
                    .and_then(Value::as_str)
                    .unwrap_or("");
                parts.push(format!("## {title}\n{url}\n\n{body}"));
                sources.push(Source {
                    title: title.to_string(),
                    url: url.to_string(),
                    description: String::new(),
                });
            }
            return NormalizedResponse::ok(parts.join("\n\n---\n\n")).with_sources(sources);
        }

        NormalizedResponse::empty_success_placeholder(self.tool_name())
    }
}

fn default_crawl_mode(params: &Map<String, Value>) -> &'static str {
    if params.contains_key("urls") {
        "batch"
    } else {
        "single"
    }
}
