//! Error types for the skillforge domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all skillforge operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Completion service errors ---
    #[error("Completion error: {0}")]
    Completion(#[from] CompletionError),

    // --- Tool invocation errors ---
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    // --- Skill catalog / knowledge errors ---
    #[error("Skill error: {0}")]
    Skill(#[from] SkillError),

    // --- Agent loop errors ---
    #[error("Agent error: {0}")]
    Agent(#[from] AgentError),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Errors from the completion service (the black-box LLM backend).
#[derive(Debug, Clone, Error)]
pub enum CompletionError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Malformed completion response: {0}")]
    MalformedResponse(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

/// Errors from tool invocation.
///
/// `Timeout`, `Transport` and `Logical` are always recovered locally by the
/// adapter: they become a normalized failure observation fed back into the
/// transcript, never a crash of the reasoning loop.
#[derive(Debug, Clone, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Tool timed out: {tool_name} after {timeout_secs}s")]
    Timeout { tool_name: String, timeout_secs: u64 },

    #[error("Tool transport failure: {0}")]
    Transport(String),

    #[error("Tool reported failure: {0}")]
    Logical(String),

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),
}

/// Errors from the skill catalog and knowledge cache.
#[derive(Debug, Error)]
pub enum SkillError {
    #[error("Catalog load failed: {0}")]
    Catalog(String),

    /// Non-fatal: callers treat this as a signal to bypass the cache.
    #[error("Cache integrity error: {0}")]
    CacheIntegrity(String),
}

/// Errors from the agent reasoning loop.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Model output not actionable: {0}")]
    Parse(String),

    #[error("Iteration budget exhausted after {iterations} iterations")]
    BudgetExceeded { iterations: usize },

    #[error("Planning failed: {0}")]
    Planning(String),
}
