//! Prompt assembly for the reasoning loop.

use skillforge_core::{ChatMessage, SkillCatalog, Transcript};

const TASK_FRAMING: &str = "\
You are a research assistant that solves tasks step by step using tools.

At each step, respond in exactly one of these two forms:

1. To call a tool:
Thought: <your reasoning>
Action: <tool name>
Action Input: <JSON arguments>

2. To finish:
Thought: <your reasoning>
Final Answer: <your complete answer>

Call only tools from the list below. Use one tool per step.";

/// The fixed system message: task framing, tool catalog, and any injected
/// tool-usage knowledge.
pub fn system_message(
    catalog: &SkillCatalog,
    available_tools: &[String],
    knowledge: &str,
) -> ChatMessage {
    let mut text = String::from(TASK_FRAMING);

    text.push_str("\n\nAvailable tools:\n");
    for doc in catalog.iter() {
        if !available_tools.is_empty() && !available_tools.contains(&doc.tool_name) {
            continue;
        }
        text.push_str(&format!("- {}: {}\n", doc.tool_name, doc.description));
    }

    if !knowledge.trim().is_empty() {
        text.push_str("\n\nTool usage notes:\n");
        text.push_str(knowledge);
    }

    ChatMessage::system(text)
}

/// The user message: the task plus the transcript so far and the cue for
/// the next thought.
pub fn user_message(query: &str, transcript: &Transcript) -> ChatMessage {
    let mut text = format!("Task: {query}\n");
    if !transcript.is_empty() {
        text.push('\n');
        text.push_str(&transcript.render());
    }
    text.push_str("\nThought:");
    ChatMessage::user(text)
}
