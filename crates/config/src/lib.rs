//! Configuration loading and validation for skillforge.
//!
//! Loads configuration from `~/.skillforge/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.skillforge/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Completion-service API key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Completion service base URL.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Default model.
    #[serde(default = "default_model")]
    pub model: String,

    /// Default temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Default max tokens per response.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default)]
    pub agent: AgentSection,

    #[serde(default)]
    pub adapter: AdapterSection,

    #[serde(default)]
    pub skills: SkillsSection,
}

fn default_api_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_model() -> String {
    "gpt-4o-mini".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    4096
}
fn default_true() -> bool {
    true
}

fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("agent", &self.agent)
            .field("adapter", &self.adapter)
            .field("skills", &self.skills)
            .finish()
    }
}

/// Reasoning-loop budgets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSection {
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    /// Unparseable model output is retried this many times before failing.
    #[serde(default = "default_max_parse_retries")]
    pub max_parse_retries: usize,

    /// Unknown-tool actions are corrected this many times before failing.
    #[serde(default = "default_max_correction_attempts")]
    pub max_correction_attempts: usize,

    /// Per-step observation length bound, in chars.
    #[serde(default = "default_max_observation_chars")]
    pub max_observation_chars: usize,
}

fn default_max_iterations() -> usize {
    10
}
fn default_max_parse_retries() -> usize {
    2
}
fn default_max_correction_attempts() -> usize {
    2
}
fn default_max_observation_chars() -> usize {
    4_000
}

impl Default for AgentSection {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            max_parse_retries: default_max_parse_retries(),
            max_correction_attempts: default_max_correction_attempts(),
            max_observation_chars: default_max_observation_chars(),
        }
    }
}

/// Tool transport settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdapterSection {
    /// Base URL of the tool gateway.
    #[serde(default = "default_tool_url")]
    pub tool_url: String,

    /// Gateway API key, if the gateway requires one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_api_key: Option<String>,
}

fn default_tool_url() -> String {
    "http://localhost:8810".into()
}

impl Default for AdapterSection {
    fn default() -> Self {
        Self {
            tool_url: default_tool_url(),
            tool_api_key: None,
        }
    }
}

/// Skill catalog and knowledge-injection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillsSection {
    /// Directory of skill documents.
    #[serde(default = "default_catalog_dir")]
    pub catalog_dir: PathBuf,

    /// Char budget for the injected knowledge fragment.
    #[serde(default = "default_knowledge_budget_chars")]
    pub knowledge_budget_chars: usize,

    /// Cache entry time-to-live.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Cache capacity before insertion-order eviction.
    #[serde(default = "default_cache_max_entries")]
    pub cache_max_entries: usize,

    /// Whether the session knowledge cache is used at all.
    #[serde(default = "default_true")]
    pub cache_enabled: bool,
}

fn default_catalog_dir() -> PathBuf {
    PathBuf::from("skills")
}
fn default_knowledge_budget_chars() -> usize {
    5_000
}
fn default_cache_ttl_secs() -> u64 {
    300
}
fn default_cache_max_entries() -> usize {
    100
}

impl Default for SkillsSection {
    fn default() -> Self {
        Self {
            catalog_dir: default_catalog_dir(),
            knowledge_budget_chars: default_knowledge_budget_chars(),
            cache_ttl_secs: default_cache_ttl_secs(),
            cache_max_entries: default_cache_max_entries(),
            cache_enabled: true,
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.skillforge/config.toml).
    ///
    /// Also checks environment variables:
    /// - `SKILLFORGE_API_KEY` (highest priority), then `OPENAI_API_KEY`
    /// - `SKILLFORGE_MODEL` overrides the model
    /// - `SKILLFORGE_API_URL` overrides the base URL
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;

        if config.api_key.is_none() {
            config.api_key = std::env::var("SKILLFORGE_API_KEY")
                .ok()
                .or_else(|| std::env::var("OPENAI_API_KEY").ok());
        }
        if let Ok(model) = std::env::var("SKILLFORGE_MODEL") {
            config.model = model;
        }
        if let Ok(url) = std::env::var("SKILLFORGE_API_URL") {
            config.api_url = url;
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".skillforge")
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.temperature < 0.0 || self.temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "temperature must be between 0.0 and 2.0".into(),
            ));
        }
        if self.agent.max_iterations == 0 {
            return Err(ConfigError::ValidationError(
                "agent.max_iterations must be at least 1".into(),
            ));
        }
        if self.skills.knowledge_budget_chars == 0 {
            return Err(ConfigError::ValidationError(
                "skills.knowledge_budget_chars must be > 0".into(),
            ));
        }
        Ok(())
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: default_api_url(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            agent: AgentSection::default(),
            adapter: AdapterSection::default(),
            skills: SkillsSection::default(),
        }
    }
}

fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
