//! Normalizer for the `python_sandbox` code execution tool.

use serde_json::{json, Value};
use skillforge_core::{InvocationMode, NormalizedResponse, ResearchMode};

use crate::normalize::{coerce_object, merge_defaults, precheck, ToolNormalizer, ToolTimeoutClass};
use crate::profiles;

pub struct SandboxNormalizer;

impl ToolNormalizer for SandboxNormalizer {
    fn tool_name(&self) -> &str {
        "python_sandbox"
    }

    fn timeout_class(&self) -> ToolTimeoutClass {
        ToolTimeoutClass::Heavy
    }

    fn normalize_request(&self, raw: Value, _mode: InvocationMode, research: ResearchMode) -> Value {
        let mut params = coerce_object(raw, "code");

        // Models nest the source under assorted keys; flatten to `code`.
        if !params.contains_key("code") {
            for key in ["input", "script", "source", "params"] {
                let Some(candidate) = params.remove(key) else {
                    continue;
                };
                match candidate {
                    Value::String(s) => {
                        params.insert("code".into(), json!(s));
                        break;
                    }
                    Value::Object(inner) => {
                        if let Some(code) = inner.get("code").and_then(Value::as_str) {
                            params.insert("code".into(), json!(code));
                            break;
                        }
                    }
                    _ => {}
                }
            }
        }

        merge_defaults(&mut params, profiles::sandbox_defaults(research));
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

        let stdout = value.get("stdout").and_then(Value::as_str).unwrap_or("");
        let stderr = value.get("stderr").and_then(Value::as_str).unwrap_or("");
        let exit_code = value.get("exit_code").and_then(Value::as_i64);

        if let Some(code) = exit_code
            && code != 0
        {
            let detail = if stderr.trim().is_empty() { stdout } else { stderr };
            return NormalizedResponse::failure(format!(
                "Execution failed with exit code {code}:\n{detail}"
            ));
        }

        let mut parts = Vec::new();
        if !stdout.trim().is_empty() {
            parts.push(stdout.trim_end().to_string());
        }
        if !stderr.trim().is_empty() {
            parts.push(format!("stderr:\n{}", stderr.trim_end()));
        }
        // Some runtimes return an expression result instead of printing.
        if parts.is_empty()
            && let Some(result) = value.get("result")
            && !result.is_null()
        {
            let text = match result {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            if !text.trim().is_empty() {
                parts.push(text);
            }
        }

        if parts.is_empty() {
            return NormalizedResponse::empty_success_placeholder(self.tool_name());
        }
        NormalizedResponse::ok(parts.join("\n\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_is_flattened_from_nested_keys() {
        let req = SandboxNormalizer.normalize_request(
            json!({"input": {"code": "print(1)"}}),
            InvocationMode::Agent,
            ResearchMode::Standard,
        );
        assert_eq!(req["code"], json!("print(1)"));
        assert_eq!(req["time_limit_secs"], json!(30));
    }

    #[test]
    fn stray_string_is_treated_as_code() {
        let req = SandboxNormalizer.normalize_request(
            json!("print('hi')"),
            InvocationMode::Agent,
            ResearchMode::Standard,
        );
        assert_eq!(req["code"], json!("print('hi')"));
    }

    #[test]
    fn nonzero_exit_code_is_failure() {
        let obs = SandboxNormalizer.normalize_response(
            Some(json!({"stdout": "", "stderr": "NameError: x", "exit_code": 1})),
            InvocationMode::Agent,
            ResearchMode::Standard,
        );
        assert!(obs.is_error);
        assert!(obs.output.contains("NameError"));
    }

    #[test]
    fn silent_success_yields_placeholder() {
        let obs = SandboxNormalizer.normalize_response(
            Some(json!({"stdout": "", "stderr": "", "exit_code": 0})),
            InvocationMode::Agent,
            ResearchMode::Standard,
        );
        assert!(obs.success);
        assert!(!obs.output.is_empty());
    }

    #[test]
    fn expression_result_is_surfaced() {
        let obs = SandboxNormalizer.normalize_response(
            Some(json!({"result": 42, "exit_code": 0})),
            InvocationMode::Agent,
            ResearchMode::Standard,
        );
        assert_eq!(obs.output, "42");
    }
}
