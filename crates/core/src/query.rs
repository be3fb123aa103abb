//! Per-turn query context and agent-facing mode enums.

use serde::{Deserialize, Serialize};

/// Invocation mode: a plain tool call versus a call issued from inside the
/// reasoning loop. Several normalizers shape their output differently per
/// mode (agent-mode observations are formatted for re-prompting).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InvocationMode {
    #[default]
    Standard,
    Agent,
}

/// A named research profile selecting tool-call defaults and timeouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ResearchMode {
    #[default]
    Standard,
    Deep,
    Academic,
    Technical,
}

impl ResearchMode {
    /// Timeout multiplier applied on top of a tool's base timeout.
    pub fn timeout_factor(&self) -> f64 {
        match self {
            ResearchMode::Standard => 1.0,
            ResearchMode::Technical => 1.5,
            ResearchMode::Academic => 2.0,
            ResearchMode::Deep => 3.0,
        }
    }
}

impl std::str::FromStr for ResearchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "standard" => Ok(ResearchMode::Standard),
            "deep" => Ok(ResearchMode::Deep),
            "academic" => Ok(ResearchMode::Academic),
            "technical" => Ok(ResearchMode::Technical),
            other => Err(format!("unknown research mode: {other}")),
        }
    }
}

/// Transient context for one user turn.
#[derive(Debug, Clone, Default)]
pub struct QueryContext {
    /// The user's query text.
    pub text: String,

    /// Hard filter: when non-empty, only these tools may be matched.
    pub available_tools: Vec<String>,

    /// Optional category hint from the caller (e.g. "search").
    pub category_hint: Option<String>,

    /// Opaque conversation identity, used only as a cache partition key.
    pub session_id: String,

    /// Active research profile, if any.
    pub research_mode: Option<ResearchMode>,
}

impl QueryContext {
    pub fn new(text: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            session_id: session_id.into(),
            ..Default::default()
        }
    }

    pub fn with_available_tools(mut self, tools: Vec<String>) -> Self {
        self.available_tools = tools;
        self
    }

    pub fn with_category_hint(mut self, hint: impl Into<String>) -> Self {
        self.category_hint = Some(hint.into());
        self
    }

    pub fn with_research_mode(mut self, mode: ResearchMode) -> Self {
        self.research_mode = Some(mode);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn research_mode_parses_case_insensitive() {
        assert_eq!("Deep".parse::<ResearchMode>().unwrap(), ResearchMode::Deep);
        assert!("warp".parse::<ResearchMode>().is_err());
    }

    #[test]
    fn deep_mode_has_largest_timeout_factor() {
        assert!(ResearchMode::Deep.timeout_factor() > ResearchMode::Standard.timeout_factor());
        assert!(ResearchMode::Deep.timeout_factor() > ResearchMode::Academic.timeout_factor());
    }

    #[test]
    fn query_context_builder() {
        let ctx = QueryContext::new("find chips", "sess-1")
            .with_available_tools(vec!["tavily_search".into()])
            .with_category_hint("search")
            .with_research_mode(ResearchMode::Academic);
        assert_eq!(ctx.text, "find chips");
        assert_eq!(ctx.available_tools.len(), 1);
        assert_eq!(ctx.category_hint.as_deref(), Some("search"));
        assert_eq!(ctx.research_mode, Some(ResearchMode::Academic));
    }
}
