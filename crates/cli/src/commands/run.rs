//! `skillforge run` — Answer one query with the agent loop.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use skillforge_adapter::{HttpToolService, ToolAdapter};
use skillforge_agent::{AgentConfig, AgentLoop};
use skillforge_config::AppConfig;
use skillforge_core::query::{InvocationMode, QueryContext, ResearchMode};
use skillforge_providers::OpenAiCompatProvider;
use skillforge_skills::{
    KnowledgeCompressor, KnowledgeFederation, SessionKnowledgeCache, SkillIndex,
};

pub async fn run(
    query: String,
    session: String,
    research: ResearchMode,
    catalog_flag: Option<PathBuf>,
    tools: Vec<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    // Check for API key early — give a clear error
    let Some(api_key) = config.api_key.clone() else {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    SKILLFORGE_API_KEY = 'sk-...'");
        eprintln!("    OPENAI_API_KEY     = 'sk-...'");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    };

    let catalog = super::load_catalog(&super::catalog_dir(&config, catalog_flag))?;

    let provider = OpenAiCompatProvider::new("openai-compat", &config.api_url, api_key)
        .map_err(|e| format!("Failed to build completion client: {e}"))?;

    let service = HttpToolService::new(
        config.adapter.tool_url.clone(),
        config.adapter.tool_api_key.clone(),
    )
    .map_err(|e| format!("Failed to build tool client: {e}"))?;
    let adapter = ToolAdapter::new(Arc::new(service));

    // A disabled cache is modelled as one that can hold nothing.
    let (ttl, max_entries) = if config.skills.cache_enabled {
        (
            Duration::from_secs(config.skills.cache_ttl_secs),
            config.skills.cache_max_entries,
        )
    } else {
        (Duration::ZERO, 0)
    };

    let agent_config = AgentConfig {
        model: config.model.clone(),
        temperature: config.temperature,
        max_tokens: Some(config.max_tokens),
        max_iterations: config.agent.max_iterations,
        max_parse_retries: config.agent.max_parse_retries,
        max_correction_attempts: config.agent.max_correction_attempts,
        max_observation_chars: config.agent.max_observation_chars,
        knowledge_budget_chars: config.skills.knowledge_budget_chars,
    };

    let agent = AgentLoop::new(
        Arc::new(provider),
        Arc::new(adapter),
        Arc::new(SkillIndex::new(Arc::clone(&catalog))),
        Arc::new(KnowledgeCompressor::new()),
        Arc::new(SessionKnowledgeCache::new(ttl, max_entries)),
        Arc::new(KnowledgeFederation::new(catalog)),
    )
    .with_config(agent_config);

    let mut ctx = QueryContext::new(query, session).with_research_mode(research);
    if !tools.is_empty() {
        ctx = ctx.with_available_tools(tools);
    }

    tracing::info!(model = %config.model, research = ?research, "Starting agent run");
    let outcome = agent.run(&ctx, InvocationMode::Agent).await;
    tracing::info!(
        iterations = outcome.iterations,
        success = outcome.success,
        "Agent run finished"
    );

    println!("{}", outcome.content);

    if outcome.truncated {
        eprintln!();
        eprintln!(
            "  ⚠️  Stopped after {} iterations without a final answer",
            outcome.iterations
        );
    }

    match outcome.error {
        Some(err) if !outcome.success => {
            eprintln!();
            Err(format!("Agent run failed: {err}").into())
        }
        _ => Ok(()),
    }
}
