//! Shared scripted mocks for loop tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use skillforge_core::{
    CompletionError, CompletionProvider, CompletionRequest, CompletionResponse, SkillCatalog,
    SkillDocument, ToolError, ToolService,
};

/// Returns the next scripted completion on each call. Panics when the
/// script runs dry.
pub struct SequentialMockProvider {
    responses: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl SequentialMockProvider {
    pub fn new(responses: Vec<&str>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into_iter().map(str::to_string).collect()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionProvider for SequentialMockProvider {
    fn name(&self) -> &str {
        "sequential_mock"
    }

    async fn complete(
        &self,
        _request: CompletionRequest,
    ) -> Result<CompletionResponse, CompletionError> {
        let count = self.calls.fetch_add(1, Ordering::SeqCst);
        let responses = self.responses.lock().unwrap();
        let content = responses
            .get(count)
            .unwrap_or_else(|| {
                panic!(
                    "SequentialMockProvider: no more responses (call #{count}, have {})",
                    responses.len()
                )
            })
            .clone();
        Ok(CompletionResponse {
            content,
            model: "mock-model".into(),
            usage: None,
        })
    }
}

/// Scripted tool transport; each call pops the next outcome.
pub struct ScriptedToolService {
    script: Mutex<Vec<ScriptedCall>>,
}

pub enum ScriptedCall {
    Respond(serde_json::Value),
    Fail(ToolError),
    Hang,
}

impl ScriptedToolService {
    pub fn new(script: Vec<ScriptedCall>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script),
        })
    }
}

#[async_trait]
impl ToolService for ScriptedToolService {
    async fn call_tool(
        &self,
        _tool_name: &str,
        _parameters: serde_json::Value,
    ) -> Result<serde_json::Value, ToolError> {
        let next = self.script.lock().unwrap().remove(0);
        match next {
            ScriptedCall::Respond(v) => Ok(v),
            ScriptedCall::Fail(e) => Err(e),
            ScriptedCall::Hang => {
                tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
                unreachable!()
            }
        }
    }
}

pub fn make_doc(tool: &str, description: &str) -> SkillDocument {
    SkillDocument {
        tool_name: tool.into(),
        name: tool.into(),
        description: description.into(),
        category: String::new(),
        tags: vec!["search".into()],
        priority: 5,
        version: "1".into(),
        referenced_documents: vec![],
        full_text: format!("## Call Structure\nHow to call {tool}.\n"),
    }
}

pub fn make_catalog() -> Arc<SkillCatalog> {
    Arc::new(SkillCatalog::from_documents(vec![
        make_doc("tavily_search", "Search the web"),
        make_doc("python_sandbox", "Run Python code"),
    ]))
}
