//! HTTP-backed tool transport.
//!
//! Tools run behind a gateway that accepts `POST /tools/invoke` with a
//! `{tool, parameters}` body and returns the tool's raw JSON payload.

use async_trait::async_trait;
use serde_json::Value;
use skillforge_core::{ToolError, ToolService};
use tracing::debug;

pub struct HttpToolService {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl HttpToolService {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Result<Self, ToolError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .map_err(|e| ToolError::Transport(e.to_string()))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            client,
        })
    }
}

#[async_trait]
impl ToolService for HttpToolService {
    async fn call_tool(&self, tool_name: &str, parameters: Value) -> Result<Value, ToolError> {
        let url = format!("{}/tools/invoke", self.base_url);
        let body = serde_json::json!({
            "tool": tool_name,
            "parameters": parameters,
        });

        debug!(tool = %tool_name, "Dispatching tool call");

        let mut request = self.client.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.header("Authorization", format!("Bearer {key}"));
        }

        let response = request
            .send()
            .await
            .map_err(|e| ToolError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        if status == 404 {
            return Err(ToolError::NotFound(tool_name.to_string()));
        }
        if status >= 400 {
            let error_body = response.text().await.unwrap_or_default();
            return Err(ToolError::Logical(format!(
                "tool gateway returned {status}: {error_body}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| ToolError::Transport(format!("malformed tool payload: {e}")))
    }
}
