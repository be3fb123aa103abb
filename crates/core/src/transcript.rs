//! The agent transcript — ordered thought/action/observation steps.
//!
//! Append-only for the duration of one agent run; owned exclusively by the
//! loop executing the run.

use serde::{Deserialize, Serialize};

use crate::observation::NormalizedResponse;

/// The action half of a transcript step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentAction {
    pub tool_name: String,
    pub input: serde_json::Value,
}

/// One completed Plan → Act → Observe cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptStep {
    /// The model's reasoning for this step.
    pub thought: String,
    /// Which tool was called with what input.
    pub action: AgentAction,
    /// The normalized tool result.
    pub observation: NormalizedResponse,
}

/// The transcript accumulated across one run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transcript {
    steps: Vec<TranscriptStep>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, step: TranscriptStep) {
        self.steps.push(step);
    }

    pub fn steps(&self) -> &[TranscriptStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Render the transcript as alternating Thought/Action/Observation blocks
    /// for re-prompting.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for step in &self.steps {
            if !step.thought.is_empty() {
                out.push_str(&format!("Thought: {}\n", step.thought));
            }
            out.push_str(&format!("Action: {}\n", step.action.tool_name));
            out.push_str(&format!("Action Input: {}\n", step.action.input));
            out.push_str(&format!("Observation: {}\n", step.observation.output));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_includes_all_blocks() {
        let mut transcript = Transcript::new();
        transcript.push(TranscriptStep {
            thought: "I should search".into(),
            action: AgentAction {
                tool_name: "tavily_search".into(),
                input: serde_json::json!({"query": "AI chips"}),
            },
            observation: NormalizedResponse::ok("3 results found"),
        });

        let rendered = transcript.render();
        assert!(rendered.contains("Thought: I should search"));
        assert!(rendered.contains("Action: tavily_search"));
        assert!(rendered.contains("Observation: 3 results found"));
    }

    #[test]
    fn empty_transcript_renders_empty() {
        assert!(Transcript::new().render().is_empty());
    }

    #[test]
    fn actions_compare_by_tool_and_input() {
        let action = AgentAction {
            tool_name: "tavily_search".into(),
            input: serde_json::json!({"query": "x"}),
        };
        assert_eq!(action.clone(), action);
        assert_ne!(
            action,
            AgentAction {
                tool_name: "tavily_search".into(),
                input: serde_json::json!({"query": "y"}),
            }
        );
    }
}
