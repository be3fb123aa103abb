//! Normalizer for the `chess_engine` position analysis tool.

use serde_json::Value;
use skillforge_core::{InvocationMode, NormalizedResponse, ResearchMode};

use crate::normalize::{coerce_object, merge_defaults, precheck, ToolNormalizer, ToolTimeoutClass};
use crate::profiles;

pub struct ChessNormalizer;

impl ToolNormalizer for ChessNormalizer {
    fn tool_name(&self) -> &str {
        "chess_engine"
    }

    fn timeout_class(&self) -> ToolTimeoutClass {
        ToolTimeoutClass::Fast
    }

    fn normalize_request(&self, raw: Value, _mode: InvocationMode, research: ResearchMode) -> Value {
        let mut params = coerce_object(raw, "fen");
        if !params.contains_key("fen")
            && let Some(position) = params.remove("position")
        {
            params.insert("fen".into(), position);
        }
        merge_defaults(&mut params, profiles::chess_defaults(research));
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

        let mut lines = Vec::new();
        if let Some(best) = value.get("best_move").and_then(Value::as_str) {
            lines.push(format!("Best move: {best}"));
        }
        if let Some(eval) = value.get("evaluation") {
            let text = match eval {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            lines.push(format!("Evaluation: {text}"));
        }
        if let Some(pv) = value.get("principal_variation").and_then(Value::as_array) {
            let moves: Vec<&str> = pv.iter().filter_map(Value::as_str).collect();
            if !moves.is_empty() {
                lines.push(format!("Line: {}", moves.join(" ")));
            }
        }
        if let Some(analysis) = value.get("analysis").and_then(Value::as_str)
            && !analysis.trim().is_empty()
        {
            lines.push(analysis.to_string());
        }

        if lines.is_empty() {
            return NormalizedResponse::empty_success_placeholder(self.tool_name());
        }
        NormalizedResponse::ok(lines.join("\n"))
    }
}
