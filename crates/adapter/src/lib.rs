//! Mode-aware tool request/response normalization.
//!
//! The adapter owns a registry of per-tool normalizers, a transport
//! ([`skillforge_core::ToolService`]), and the timeout policy. `invoke`
//! never propagates an error to the caller: every failure mode becomes a
//! well-formed failure observation the reasoning loop can show the model.

pub mod chess;
pub mod crawl;
pub mod http;
pub mod image;
pub mod normalize;
pub mod profiles;
pub mod sandbox;
pub mod search;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use skillforge_core::{InvocationMode, NormalizedResponse, ResearchMode, ToolError, ToolService};
use tracing::{debug, warn};

pub use http::HttpToolService;
pub use normalize::{GenericNormalizer, ToolNormalizer, ToolTimeoutClass};

/// Base timeouts per tool class and the absolute ceiling, in seconds.
const FAST_BASE_SECS: u64 = 10;
const NETWORK_BASE_SECS: u64 = 30;
const HEAVY_BASE_SECS: u64 = 60;
const TIMEOUT_CEILING_SECS: u64 = 120;

/// Effective timeout for a tool class under a research mode.
pub fn effective_timeout(class: ToolTimeoutClass, research: ResearchMode) -> Duration {
    let base = match class {
        ToolTimeoutClass::Fast => FAST_BASE_SECS,
        ToolTimeoutClass::Network => NETWORK_BASE_SECS,
        ToolTimeoutClass::Heavy => HEAVY_BASE_SECS,
    };
    let scaled = (base as f64 * research.timeout_factor()).round() as u64;
    Duration::from_secs(scaled.min(TIMEOUT_CEILING_SECS))
}

pub struct ToolAdapter {
    normalizers: HashMap<String, Box<dyn ToolNormalizer>>,
    service: Arc<dyn ToolService>,
}

impl ToolAdapter {
    /// Build an adapter with the standard tool set registered.
    pub fn new(service: Arc<dyn ToolService>) -> Self {
        let mut adapter = Self {
            normalizers: HashMap::new(),
            service,
        };
        adapter.register(Box::new(search::SearchNormalizer));
        adapter.register(Box::new(crawl::CrawlNormalizer));
        adapter.register(Box::new(sandbox::SandboxNormalizer));
        adapter.register(Box::new(image::ImageNormalizer));
        adapter.register(Box::new(chess::ChessNormalizer));
        adapter
    }

    /// Register a normalizer, replacing any existing one for the same tool.
    pub fn register(&mut self, normalizer: Box<dyn ToolNormalizer>) {
        self.normalizers
            .insert(normalizer.tool_name().to_string(), normalizer);
    }

    pub fn normalize_request(
        &self,
        tool_name: &str,
        raw: Value,
        mode: InvocationMode,
        research: ResearchMode,
    ) -> Value {
        match self.normalizers.get(tool_name) {
            Some(n) => n.normalize_request(raw, mode, research),
            None => GenericNormalizer::for_tool(tool_name).normalize_request(raw, mode, research),
        }
    }

    pub fn normalize_response(
        &self,
        tool_name: &str,
        raw: Option<Value>,
        mode: InvocationMode,
        research: ResearchMode,
    ) -> NormalizedResponse {
        match self.normalizers.get(tool_name) {
            Some(n) => n.normalize_response(raw, mode, research),
            None => GenericNormalizer::for_tool(tool_name).normalize_response(raw, mode, research),
        }
    }

    fn timeout_class(&self, tool_name: &str) -> ToolTimeoutClass {
        self.normalizers
            .get(tool_name)
            .map(|n| n.timeout_class())
            .unwrap_or(ToolTimeoutClass::Network)
    }

    /// Normalize the request, run the tool under the timeout policy, and
    /// normalize whatever comes back. Failures become observations.
    pub async fn invoke(
        &self,
        tool_name: &str,
        input: Value,
        mode: InvocationMode,
        research: ResearchMode,
    ) -> NormalizedResponse {
        let request = self.normalize_request(tool_name, input, mode, research);
        let timeout = effective_timeout(self.timeout_class(tool_name), research);

        debug!(tool = %tool_name, timeout_secs = timeout.as_secs(), "Invoking tool");

        let outcome =
            tokio::time::timeout(timeout, self.service.call_tool(tool_name, request)).await;

        match outcome {
            Ok(Ok(raw)) => self.normalize_response(tool_name, Some(raw), mode, research),
            Ok(Err(err)) => {
                warn!(tool = %tool_name, error = %err, "Tool call failed");
                self.classify_failure(tool_name, err)
            }
            Err(_elapsed) => {
                warn!(tool = %tool_name, timeout_secs = timeout.as_secs(), "Tool call timed out");
                NormalizedResponse::failure(format!(
                    "The {tool_name} call timed out after {} seconds. \
                     Consider a narrower request or a different tool.",
                    timeout.as_secs()
                ))
            }
        }
    }

    fn classify_failure(&self, tool_name: &str, err: ToolError) -> NormalizedResponse {
        let message = match err {
            ToolError::NotFound(name) => {
                format!("Tool '{name}' is not available.")
            }
            ToolError::Timeout { timeout_secs, .. } => format!(
                "The {tool_name} call timed out after {timeout_secs} seconds."
            ),
            ToolError::Transport(detail) => {
                format!("Network error while calling {tool_name}: {detail}")
            }
            ToolError::InvalidArguments(detail) => {
                format!("Invalid arguments for {tool_name}: {detail}")
            }
            ToolError::Logical(detail) => {
                format!("The {tool_name} call failed: {detail}")
            }
        };
        NormalizedResponse::failure(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// Scripted tool transport: pops the next queued outcome per call.
    struct ScriptedService {
        script: Mutex<Vec<ScriptedCall>>,
    }

    enum ScriptedCall {
        Respond(Value),
        Fail(ToolError),
        Hang,
    }

    impl ScriptedService {
        fn new(script: Vec<ScriptedCall>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script),
            })
        }
    }

    #[async_trait]
    impl ToolService for ScriptedService {
        async fn call_tool(&self, _tool_name: &str, _parameters: Value) -> Result<Value, ToolError> {
            let next = self.script.lock().unwrap().remove(0);
            match next {
                ScriptedCall::Respond(v) => Ok(v),
                ScriptedCall::Fail(e) => Err(e),
                ScriptedCall::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    unreachable!()
                }
            }
        }
    }

    #[test]
    fn timeout_scales_and_caps() {
        assert_eq!(
            effective_timeout(ToolTimeoutClass::Network, ResearchMode::Standard),
            Duration::from_secs(30)
        );
        assert_eq!(
            effective_timeout(ToolTimeoutClass::Network, ResearchMode::Deep),
            Duration::from_secs(90)
        );
        // 60 * 3.0 = 180, capped at the ceiling.
        assert_eq!(
            effective_timeout(ToolTimeoutClass::Heavy, ResearchMode::Deep),
            Duration::from_secs(120)
        );
    }

    #[tokio::test]
    async fn invoke_normalizes_success() {
        let service = ScriptedService::new(vec![ScriptedCall::Respond(json!({
            "results": [{"title": "T", "url": "https://t.example", "content": "body"}]
        }))]);
        let adapter = ToolAdapter::new(service);

        let obs = adapter
            .invoke(
                "tavily_search",
                json!("chips"),
                InvocationMode::Agent,
                ResearchMode::Standard,
            )
            .await;
        assert!(obs.success);
        assert!(obs.output.contains("T"));
        assert_eq!(obs.sources.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn invoke_turns_timeout_into_failure_observation() {
        let service = ScriptedService::new(vec![ScriptedCall::Hang]);
        let adapter = ToolAdapter::new(service);

        let obs = adapter
            .invoke(
                "tavily_search",
                json!("slow"),
                InvocationMode::Agent,
                ResearchMode::Standard,
            )
            .await;
        assert!(!obs.success);
        assert!(obs.is_error);
        assert!(obs.output.contains("timed out"));
    }

    #[tokio::test]
    async fn invoke_classifies_transport_failure() {
        let service = ScriptedService::new(vec![ScriptedCall::Fail(ToolError::Transport(
            "connection refused".into(),
        ))]);
        let adapter = ToolAdapter::new(service);

        let obs = adapter
            .invoke(
                "web_crawler",
                json!({"url": "https://x.example"}),
                InvocationMode::Agent,
                ResearchMode::Standard,
            )
            .await;
        assert!(!obs.success);
        assert!(obs.output.contains("Network error"));
    }

    #[tokio::test]
    async fn unknown_tool_uses_generic_normalizer() {
        let service = ScriptedService::new(vec![ScriptedCall::Respond(json!({
            "content": "unstructured"
        }))]);
        let adapter = ToolAdapter::new(service);

        let obs = adapter
            .invoke(
                "mystery_tool",
                json!({}),
                InvocationMode::Agent,
                ResearchMode::Standard,
            )
            .await;
        assert!(obs.success);
        assert_eq!(obs.output, "unstructured");
    }

    #[test]
    fn null_response_is_failure_for_every_known_tool() {
        let service = ScriptedService::new(vec![]);
        let adapter = ToolAdapter::new(service);
        for tool in [
            "tavily_search",
            "web_crawler",
            "python_sandbox",
            "image_generator",
            "chess_engine",
        ] {
            let obs = adapter.normalize_response(
                tool,
                None,
                InvocationMode::Agent,
                ResearchMode::Standard,
            );
            assert!(!obs.success, "{tool} should fail on null");
            assert!(!obs.output.is_empty(), "{tool} output must be non-empty");
        }
    }
}
