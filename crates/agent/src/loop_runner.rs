//! The reasoning loop: Planning → Acting → Observing until the model
//! concludes or a budget runs out.
//!
//! Every collaborator is injected — provider, adapter, skill index,
//! compressor, cache — so independent runs share only the read-mostly
//! catalog and the session cache. Each iteration has exactly two
//! suspension points: the completion call and the tool call.

use std::sync::Arc;

use skillforge_adapter::ToolAdapter;
use skillforge_core::{
    AgentError, CompletionProvider, CompletionRequest, InvocationMode, LevelChoice,
    NormalizedResponse, QueryContext, Transcript, TranscriptStep,
};
use skillforge_skills::{
    CompressOptions, KnowledgeCompressor, KnowledgeFederation, SessionKnowledgeCache, SkillIndex,
};
use tracing::{debug, info, warn};

use crate::parser::{parse_plan, ParsedPlan};
use crate::prompt;

/// Knobs for one loop instance.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    pub max_iterations: usize,
    /// Unparseable model output is retried this many times before failing.
    pub max_parse_retries: usize,
    /// Unknown-tool actions are corrected this many times before failing.
    pub max_correction_attempts: usize,
    /// Per-step observation length bound.
    pub max_observation_chars: usize,
    /// Budget for the injected knowledge fragment, in chars.
    pub knowledge_budget_chars: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".into(),
            temperature: 0.7,
            max_tokens: None,
            max_iterations: 10,
            max_parse_retries: 2,
            max_correction_attempts: 2,
            max_observation_chars: 4_000,
            knowledge_budget_chars: 5_000,
        }
    }
}

/// Where the state machine currently is. Terminal: Concluding, Failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Planning,
    Acting,
    Observing,
    Concluding,
    Failed,
}

/// The structured result of one run. `run` never raises past its boundary.
#[derive(Debug)]
pub struct RunOutcome {
    pub success: bool,
    pub content: String,
    pub error: Option<String>,
    /// Set when the iteration budget cut the run short.
    pub truncated: bool,
    pub transcript: Transcript,
    pub iterations: usize,
}

pub struct AgentLoop {
    provider: Arc<dyn CompletionProvider>,
    adapter: Arc<ToolAdapter>,
    index: Arc<SkillIndex>,
    compressor: Arc<KnowledgeCompressor>,
    cache: Arc<SessionKnowledgeCache>,
    federation: Arc<KnowledgeFederation>,
    config: AgentConfig,
}

impl AgentLoop {
    pub fn new(
        provider: Arc<dyn CompletionProvider>,
        adapter: Arc<ToolAdapter>,
        index: Arc<SkillIndex>,
        compressor: Arc<KnowledgeCompressor>,
        cache: Arc<SessionKnowledgeCache>,
        federation: Arc<KnowledgeFederation>,
    ) -> Self {
        Self {
            provider,
            adapter,
            index,
            compressor,
            cache,
            federation,
            config: AgentConfig::default(),
        }
    }

    pub fn with_config(mut self, config: AgentConfig) -> Self {
        self.config = config;
        self
    }

    /// Drive one query to a conclusion.
    pub async fn run(&self, ctx: &QueryContext, mode: InvocationMode) -> RunOutcome {
        let knowledge = self.assemble_knowledge(ctx).await;
        let available: Vec<String> = if ctx.available_tools.is_empty() {
            self.index
                .catalog()
                .tool_names()
                .into_iter()
                .map(str::to_string)
                .collect()
        } else {
            ctx.available_tools.clone()
        };

        let mut transcript = Transcript::new();
        let mut parse_failures = 0usize;
        let mut correction_attempts = 0usize;
        let mut iterations = 0usize;
        let mut state = RunState::Planning;

        info!(
            session = %ctx.session_id,
            max_iterations = self.config.max_iterations,
            "Agent run starting"
        );

        while iterations < self.config.max_iterations {
            iterations += 1;
            debug!(iteration = iterations, ?state, "Planning");

            let plan = match self
                .plan(ctx, &available, &knowledge, &transcript, &mut parse_failures)
                .await
            {
                Ok(plan) => plan,
                Err(err) => {
                    state = RunState::Failed;
                    debug!(?state, "Run failed during planning");
                    return RunOutcome {
                        success: false,
                        content: String::new(),
                        error: Some(err.to_string()),
                        truncated: false,
                        transcript,
                        iterations,
                    };
                }
            };

            let (thought, action) = match plan {
                ParsedPlan::Final { answer } => {
                    state = RunState::Concluding;
                    info!(iterations, ?state, "Agent run concluded");
                    return RunOutcome {
                        success: true,
                        content: answer,
                        error: None,
                        truncated: false,
                        transcript,
                        iterations,
                    };
                }
                ParsedPlan::Act { thought, action } => (thought, action),
            };

            // Unknown tool: feed a corrective observation back rather than
            // aborting, bounded by the correction budget.
            if !available.contains(&action.tool_name) {
                correction_attempts += 1;
                if correction_attempts > self.config.max_correction_attempts {
                    state = RunState::Failed;
                    debug!(?state, "Correction budget exhausted");
                    return RunOutcome {
                        success: false,
                        content: String::new(),
                        error: Some(
                            AgentError::Planning(format!(
                                "model kept choosing unknown tool '{}'",
                                action.tool_name
                            ))
                            .to_string(),
                        ),
                        truncated: false,
                        transcript,
                        iterations,
                    };
                }

                warn!(tool = %action.tool_name, "Model chose unknown tool");
                let correction = NormalizedResponse::failure(format!(
                    "Tool '{}' is not available. Choose one of: {}.",
                    action.tool_name,
                    available.join(", ")
                ));
                transcript.push(TranscriptStep {
                    thought,
                    action,
                    observation: correction,
                });
                continue;
            }

            state = RunState::Acting;
            debug!(iteration = iterations, tool = %action.tool_name, ?state, "Acting");
            let observation = self
                .adapter
                .invoke(
                    &action.tool_name,
                    action.input.clone(),
                    mode,
                    ctx.research_mode.unwrap_or_default(),
                )
                .await;

            state = RunState::Observing;
            debug!(iteration = iterations, ?state, "Recording observation");
            let observation = bound_observation(observation, self.config.max_observation_chars);
            transcript.push(TranscriptStep {
                thought,
                action,
                observation,
            });
            state = RunState::Planning;
        }

        // Iteration budget exhausted: partial answer, clearly flagged.
        let err = AgentError::BudgetExceeded { iterations };
        warn!(iterations, "Agent run hit the iteration budget");
        RunOutcome {
            success: true,
            content: partial_answer(&transcript),
            error: Some(err.to_string()),
            truncated: true,
            transcript,
            iterations,
        }
    }

    /// One Planning phase: call the model, parse, retrying parse failures
    /// and transport errors within the retry budget.
    async fn plan(
        &self,
        ctx: &QueryContext,
        available: &[String],
        knowledge: &str,
        transcript: &Transcript,
        parse_failures: &mut usize,
    ) -> Result<ParsedPlan, AgentError> {
        let messages = vec![
            prompt::system_message(self.index.catalog(), available, knowledge),
            prompt::user_message(&ctx.text, transcript),
        ];
        let request = CompletionRequest {
            model: self.config.model.clone(),
            messages,
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        loop {
            let attempt = match self.provider.complete(request.clone()).await {
                Ok(response) => parse_plan(&response.content),
                Err(err) => Err(AgentError::Planning(format!("completion failed: {err}"))),
            };

            match attempt {
                Ok(plan) => return Ok(plan),
                Err(err) => {
                    *parse_failures += 1;
                    if *parse_failures > self.config.max_parse_retries {
                        return Err(AgentError::Parse(format!(
                            "planning failed after {} attempts: {err}",
                            *parse_failures
                        )));
                    }
                    warn!(error = %err, attempt = *parse_failures, "Retrying planning");
                }
            }
        }
    }

    /// Match skills for the query and build the knowledge fragment to
    /// inject, going through the session cache.
    async fn assemble_knowledge(&self, ctx: &QueryContext) -> String {
        let matches = self.index.match_query(ctx);
        if matches.is_empty() {
            return String::new();
        }

        let mut fragments = Vec::with_capacity(matches.len());
        for m in &matches {
            if let Some(cached) = self
                .cache
                .get(&m.tool_name, &m.document.version, &ctx.session_id, &ctx.text)
                .await
            {
                debug!(tool = %m.tool_name, "Knowledge cache hit");
                fragments.push(cached);
                continue;
            }

            // Material already shown this session only needs a pointer.
            let level = if self.cache.has_injected(&ctx.session_id, &m.tool_name).await {
                LevelChoice::Reference
            } else {
                LevelChoice::Auto
            };
            let opts = CompressOptions {
                level,
                max_chars: self.config.knowledge_budget_chars,
                query: ctx.text.clone(),
            };

            let full_text = self.federation.federated_text(&m.document);
            let compressed = self.compressor.compress(&full_text, &opts);
            debug!(
                tool = %m.tool_name,
                level = ?compressed.level,
                chars = compressed.compressed_length,
                "Compressed skill knowledge"
            );

            self.cache
                .set(
                    &m.tool_name,
                    &m.document.version,
                    &ctx.session_id,
                    &ctx.text,
                    compressed.content.clone(),
                )
                .await;
            self.cache
                .record_injected(&ctx.session_id, &m.tool_name)
                .await;
            fragments.push(compressed.content);
        }

        fragments.join("\n\n")
    }
}

/// Truncate an observation to the per-step bound, with an indicator.
fn bound_observation(mut obs: NormalizedResponse, max_chars: usize) -> NormalizedResponse {
    if obs.output.chars().count() > max_chars {
        let kept: String = obs.output.chars().take(max_chars).collect();
        obs.output = format!("{kept}\n… [observation truncated]");
    }
    obs
}

/// Best-effort answer from what the transcript gathered so far.
fn partial_answer(transcript: &Transcript) -> String {
    let last_useful = transcript
        .steps()
        .iter()
        .rev()
        .find(|s| s.observation.success && !s.observation.output.trim().is_empty());

    match last_useful {
        Some(step) => format!(
            "I reached the reasoning limit before finishing. The most recent \
             finding was:\n\n{}",
            step.observation.output
        ),
        None => "I reached the reasoning limit before finding a conclusive answer.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use serde_json::json;
    use skillforge_core::SkillCatalog;
    use std::time::Duration;

    const ACT_SEARCH: &str = "Thought: I should search.\nAction: tavily_search\nAction Input: {\"query\": \"AI chips\"}";
    const FINAL: &str = "Thought: I have enough.\nFinal Answer: Here is what I found.";

    fn build_loop(
        provider: Arc<SequentialMockProvider>,
        service: Arc<ScriptedToolService>,
    ) -> (AgentLoop, Arc<SessionKnowledgeCache>) {
        build_loop_with(provider, service, AgentConfig::default())
    }

    fn build_loop_with(
        provider: Arc<SequentialMockProvider>,
        service: Arc<ScriptedToolService>,
        config: AgentConfig,
    ) -> (AgentLoop, Arc<SessionKnowledgeCache>) {
        let catalog: Arc<SkillCatalog> = make_catalog();
        let cache = Arc::new(SessionKnowledgeCache::new(Duration::from_secs(300), 100));
        let agent = AgentLoop::new(
            provider,
            Arc::new(ToolAdapter::new(service)),
            Arc::new(SkillIndex::new(catalog.clone())),
            Arc::new(KnowledgeCompressor::new()),
            cache.clone(),
            Arc::new(KnowledgeFederation::new(catalog)),
        )
        .with_config(config);
        (agent, cache)
    }

    fn ctx(query: &str) -> QueryContext {
        QueryContext::new(query, "session-1")
    }

    #[tokio::test]
    async fn concludes_on_final_answer() {
        let provider = SequentialMockProvider::new(vec![FINAL]);
        let (agent, _) = build_loop(provider.clone(), ScriptedToolService::new(vec![]));

        let outcome = agent.run(&ctx("say hi"), InvocationMode::Agent).await;
        assert!(outcome.success);
        assert_eq!(outcome.content, "Here is what I found.");
        assert_eq!(outcome.iterations, 1);
        assert!(outcome.transcript.is_empty());
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn runs_tool_then_concludes() {
        let provider = SequentialMockProvider::new(vec![ACT_SEARCH, FINAL]);
        let service = ScriptedToolService::new(vec![ScriptedCall::Respond(json!({
            "results": [{"title": "Chip news", "url": "https://c.example", "content": "new silicon"}]
        }))]);
        let (agent, cache) = build_loop(provider, service);

        let context = ctx("search for latest AI chip announcements");
        let outcome = agent.run(&context, InvocationMode::Agent).await;

        assert!(outcome.success);
        assert_eq!(outcome.transcript.len(), 1);
        let step = &outcome.transcript.steps()[0];
        assert_eq!(step.action.tool_name, "tavily_search");
        assert!(step.observation.success);
        assert!(step.observation.output.contains("Chip news"));
        assert!(cache.has_injected("session-1", "tavily_search").await);
    }

    #[tokio::test(start_paused = true)]
    async fn second_timeout_becomes_observation_and_loop_replans() {
        let provider = SequentialMockProvider::new(vec![ACT_SEARCH, ACT_SEARCH, FINAL]);
        let service = ScriptedToolService::new(vec![
            ScriptedCall::Respond(json!({
                "results": [{"title": "First", "url": "https://f.example", "content": "ok"}]
            })),
            ScriptedCall::Hang,
        ]);
        let (agent, _) = build_loop(provider.clone(), service);

        let outcome = agent
            .run(&ctx("search for latest AI chip announcements"), InvocationMode::Agent)
            .await;

        assert!(outcome.success);
        assert_eq!(outcome.transcript.len(), 2);
        let second = &outcome.transcript.steps()[1];
        assert!(second.observation.is_error);
        assert!(second.observation.output.contains("timed out"));
        // A third planning round happened after the timeout.
        assert_eq!(provider.call_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn research_mode_scales_the_tool_timeout() {
        use skillforge_core::ResearchMode;

        let provider = SequentialMockProvider::new(vec![ACT_SEARCH, FINAL]);
        let service = ScriptedToolService::new(vec![ScriptedCall::Hang]);
        let (agent, _) = build_loop(provider, service);

        let context = ctx("search for latest AI chip announcements")
            .with_research_mode(ResearchMode::Deep);
        let outcome = agent.run(&context, InvocationMode::Agent).await;

        assert!(outcome.success);
        let step = &outcome.transcript.steps()[0];
        assert!(step.observation.is_error);
        // Network base of 30s scaled by the deep-research factor.
        assert!(step.observation.output.contains("90 seconds"));
    }

    #[tokio::test]
    async fn unknown_tool_gets_corrective_observation() {
        let provider = SequentialMockProvider::new(vec![
            "Thought: hm\nAction: magic_wand\nAction Input: {}",
            FINAL,
        ]);
        let (agent, _) = build_loop(provider, ScriptedToolService::new(vec![]));

        let outcome = agent.run(&ctx("do magic"), InvocationMode::Agent).await;
        assert!(outcome.success);
        assert_eq!(outcome.transcript.len(), 1);
        let step = &outcome.transcript.steps()[0];
        assert!(step.observation.is_error);
        assert!(step.observation.output.contains("not available"));
        assert!(step.observation.output.contains("tavily_search"));
    }

    #[tokio::test]
    async fn repeated_unknown_tool_fails_hard() {
        let bad = "Action: magic_wand\nAction Input: {}";
        let provider = SequentialMockProvider::new(vec![bad, bad, bad]);
        let (agent, _) = build_loop(provider.clone(), ScriptedToolService::new(vec![]));

        let outcome = agent.run(&ctx("do magic"), InvocationMode::Agent).await;
        assert!(!outcome.success);
        assert!(outcome.error.unwrap().contains("magic_wand"));
        assert_eq!(provider.call_count(), 3);
    }

    #[tokio::test]
    async fn garbage_output_is_retried_then_recovers() {
        let provider = SequentialMockProvider::new(vec!["I am confused.", FINAL]);
        let (agent, _) = build_loop(provider.clone(), ScriptedToolService::new(vec![]));

        let outcome = agent.run(&ctx("say hi"), InvocationMode::Agent).await;
        assert!(outcome.success);
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn garbage_output_exhausts_retries_and_fails() {
        let provider =
            SequentialMockProvider::new(vec!["nope", "still nope", "nothing actionable"]);
        let (agent, _) = build_loop(provider.clone(), ScriptedToolService::new(vec![]));

        let outcome = agent.run(&ctx("say hi"), InvocationMode::Agent).await;
        assert!(!outcome.success);
        assert!(outcome.error.is_some());
        assert_eq!(provider.call_count(), 3);
    }

    #[tokio::test]
    async fn iteration_budget_yields_flagged_partial_answer() {
        let provider = SequentialMockProvider::new(vec![ACT_SEARCH, ACT_SEARCH]);
        let service = ScriptedToolService::new(vec![
            ScriptedCall::Respond(json!({
                "results": [{"title": "Partial", "url": "https://p.example", "content": "so far"}]
            })),
            ScriptedCall::Respond(json!({
                "results": [{"title": "Latest", "url": "https://l.example", "content": "newest"}]
            })),
        ]);
        let config = AgentConfig {
            max_iterations: 2,
            ..AgentConfig::default()
        };
        let (agent, _) = build_loop_with(provider, service, config);

        let outcome = agent
            .run(&ctx("search for latest AI chip announcements"), InvocationMode::Agent)
            .await;

        assert!(outcome.success);
        assert!(outcome.truncated);
        assert!(outcome.error.is_some());
        assert!(outcome.content.contains("Latest"));
        assert_eq!(outcome.iterations, 2);
    }

    #[tokio::test]
    async fn long_observation_is_bounded_with_indicator() {
        let provider = SequentialMockProvider::new(vec![ACT_SEARCH, FINAL]);
        let huge = "x".repeat(20_000);
        let service = ScriptedToolService::new(vec![ScriptedCall::Respond(json!({
            "results": [{"title": "Big", "url": "https://b.example", "content": huge}]
        }))]);
        let config = AgentConfig {
            max_observation_chars: 500,
            ..AgentConfig::default()
        };
        let (agent, _) = build_loop_with(provider, service, config);

        let outcome = agent
            .run(&ctx("search for latest AI chip announcements"), InvocationMode::Agent)
            .await;

        let step = &outcome.transcript.steps()[0];
        assert!(step.observation.output.chars().count() < 600);
        assert!(step.observation.output.contains("[observation truncated]"));
    }
}
