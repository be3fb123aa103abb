//! ToolService trait — the seam to the external tool backends.
//!
//! One call per tool invocation: the adapter normalizes the request first,
//! hands it here, and normalizes whatever raw payload comes back. Each
//! tool's raw response shape is tool-specific; the adapter owns turning it
//! into a `NormalizedResponse`.

use async_trait::async_trait;

use crate::error::ToolError;

/// The external tool-service seam.
///
/// Implementations: HTTP tool server client, in-process test doubles.
#[async_trait]
pub trait ToolService: Send + Sync {
    /// Invoke a tool with already-normalized parameters and return its raw,
    /// tool-specific response payload.
    async fn call_tool(
        &self,
        tool_name: &str,
        parameters: serde_json::Value,
    ) -> std::result::Result<serde_json::Value, ToolError>;
}
