//! The ToolNormalizer trait and shared normalization scaffolding.
//!
//! One small normalizer object per tool, selected by name from a registry —
//! no central growing conditional. Each normalizer repairs common request
//! malformations for its tool and unwraps the tool's raw payload shape into
//! a uniform observation.

use serde_json::Value;
use skillforge_core::{InvocationMode, NormalizedResponse, ResearchMode};

/// Coarse timeout class per tool type; the base timeout comes from the
/// adapter's timeout policy, scaled by the research mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolTimeoutClass {
    /// In-process or near-instant tools.
    Fast,
    /// Ordinary network calls (search, image, engine queries).
    Network,
    /// Long-running work: crawling, sandboxed execution.
    Heavy,
}

/// Per-tool request/response normalization.
pub trait ToolNormalizer: Send + Sync {
    /// The tool this normalizer handles.
    fn tool_name(&self) -> &str;

    /// Timeout class for invocation bounding.
    fn timeout_class(&self) -> ToolTimeoutClass {
        ToolTimeoutClass::Network
    }

    /// Repair and canonicalize outgoing request parameters, then merge the
    /// research-mode profile defaults under caller-supplied values.
    fn normalize_request(&self, raw: Value, mode: InvocationMode, research: ResearchMode) -> Value;

    /// Reduce the tool's raw payload to a normalized observation. Must be
    /// total: any input, including `None`, yields a well-formed response.
    fn normalize_response(
        &self,
        raw: Option<Value>,
        mode: InvocationMode,
        research: ResearchMode,
    ) -> NormalizedResponse;
}

/// Shared precheck for every normalizer's response path.
///
/// Absent or null payloads become a well-formed failure, and an explicit
/// raw `error` field is always preferred over inferring failure elsewhere.
pub fn precheck(tool_name: &str, raw: Option<Value>) -> Result<Value, NormalizedResponse> {
    let value = match raw {
        None | Some(Value::Null) => {
            return Err(NormalizedResponse::failure(format!(
                "The {tool_name} call returned no response."
            )));
        }
        Some(v) => v,
    };

    if let Some(error) = value.get("error") {
        let message = match error {
            Value::String(s) if !s.is_empty() => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        };
        if !message.is_empty() && message != "null" {
            return Err(NormalizedResponse::failure(format!(
                "{tool_name} reported an error: {message}"
            )));
        }
    }

    if value.get("success").and_then(Value::as_bool) == Some(false) {
        let reason = value
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("no reason given");
        return Err(NormalizedResponse::failure(format!(
            "{tool_name} reported failure: {reason}"
        )));
    }

    Ok(value)
}

/// Coerce arbitrary caller input into a JSON object, wrapping a stray
/// string under `key`.
pub fn coerce_object(raw: Value, string_key: &str) -> serde_json::Map<String, Value> {
    match raw {
        Value::Object(map) => map,
        Value::String(s) => {
            let mut map = serde_json::Map::new();
            map.insert(string_key.to_string(), Value::String(s));
            map
        }
        Value::Null => serde_json::Map::new(),
        other => {
            let mut map = serde_json::Map::new();
            map.insert(string_key.to_string(), other);
            map
        }
    }
}

/// Insert each default only where the caller did not supply a value.
pub fn merge_defaults(
    params: &mut serde_json::Map<String, Value>,
    defaults: serde_json::Map<String, Value>,
) {
    for (key, value) in defaults {
        params.entry(key).or_insert(value);
    }
}

/// Fallback normalizer for tools without a dedicated implementation.
///
/// Requests pass through shape-coerced; responses are rendered as pretty
/// JSON with the usual empty-success placeholder guarantee.
pub struct GenericNormalizer {
    tool_name: String,
}

impl GenericNormalizer {
    pub fn for_tool(tool_name: &str) -> Self {
        Self {
            tool_name: tool_name.to_string(),
        }
    }
}

impl ToolNormalizer for GenericNormalizer {
    fn tool_name(&self) -> &str {
        &self.tool_name
    }

    fn normalize_request(&self, raw: Value, _mode: InvocationMode, _research: ResearchMode) -> Value {
        Value::Object(coerce_object(raw, "input"))
    }

    fn normalize_response(
        &self,
        raw: Option<Value>,
        _mode: InvocationMode,
        _research: ResearchMode,
    ) -> NormalizedResponse {
        let value = match precheck(&self.tool_name, raw) {
            Ok(v) => v,
            Err(failure) => return failure,
        };

        // Prefer an obvious text payload over a JSON dump.
        let text = value
            .get("output")
            .or_else(|| value.get("content"))
            .or_else(|| value.get("text"))
            .and_then(Value::as_str)
            .map(str::to_string);

        let output = match text {
            Some(t) if !t.trim().is_empty() => t,
            _ => {
                let dump = serde_json::to_string_pretty(&value).unwrap_or_default();
                if dump.trim().is_empty() || dump == "{}" {
                    return NormalizedResponse::empty_success_placeholder(&self.tool_name);
                }
                dump
            }
        };

        NormalizedResponse::ok(output)
    }
}
