//! Normalizer for the `image_generator` tool.

use serde_json::Value;
use skillforge_core::{InvocationMode, NormalizedResponse, ResearchMode, Source};

use crate::normalize::{coerce_object, merge_defaults, precheck, ToolNormalizer, ToolTimeoutClass};
use crate::profiles;

pub struct ImageNormalizer;

impl ToolNormalizer for ImageNormalizer {
    fn tool_name(&self) -> &str {
        "image_generator"
    }

    fn timeout_class(&self) -> ToolTimeoutClass {
        ToolTimeoutClass::Network
    }

    fn normalize_request(&self, raw: Value, _mode: InvocationMode, research: ResearchMode) -> Value {
        let mut params = coerce_object(raw, "prompt");
        if !params.contains_key("prompt")
            && let Some(desc) = params.remove("description")
        {
            params.insert("prompt".into(), desc);
        }
        merge_defaults(&mut params, profiles::image_defaults(research));
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

        let urls: Vec<String> = match value.get("images").and_then(Value::as_array) {
            Some(items) => items
                .iter()
                .filter_map(|item| {
                    item.as_str()
                        .or_else(|| item.get("url").and_then(Value::as_str))
                })
                .map(str::to_string)
                .collect(),
            None => value
                .get("url")
                .and_then(Value::as_str)
                .map(|u| vec![u.to_string()])
                .unwrap_or_default(),
        };

        if urls.is_empty() {
            return NormalizedResponse::empty_success_placeholder(self.tool_name());
        }

        let mut lines = vec![format!("Generated {} image(s):", urls.len())];
        let mut sources = Vec::with_capacity(urls.len());
        for (i, url) in urls.iter().enumerate() {
            lines.push(format!("{}. {url}", i + 1));
            sources.push(Source {
                title: format!("Generated image {}", i + 1),
                url: url.clone(),
                description: String::new(),
            });
        }
        NormalizedResponse::ok(lines.join("\n")).with_sources(sources)
    }
}
