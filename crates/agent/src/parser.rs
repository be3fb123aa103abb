//! Parsing of model output into a plan.
//!
//! The model may answer in either wire form: a JSON object
//! `{"tool_name": ..., "parameters": ...}` (bare or inside a fenced block),
//! or the textual `Action: <name>` / `Action Input: <json>` layout. Both
//! round-trip to the same [`ParsedPlan::Act`]. A `Final Answer:` marker or
//! a `{"final_answer": ...}` object concludes the run.

use serde_json::Value;
use skillforge_core::{AgentAction, AgentError};

#[derive(Debug, Clone, PartialEq)]
pub enum ParsedPlan {
    Act { thought: String, action: AgentAction },
    Final { answer: String },
}

/// Parse one model response into a plan.
pub fn parse_plan(content: &str) -> Result<ParsedPlan, AgentError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(AgentError::Parse("model returned empty content".into()));
    }

    if let Some(answer) = extract_final_answer(trimmed) {
        return Ok(ParsedPlan::Final { answer });
    }

    let thought = extract_thought(trimmed);

    // JSON forms: the whole body, or the first fenced block.
    if let Ok(value) = serde_json::from_str::<Value>(trimmed)
        && let Some(plan) = plan_from_json(&value, &thought)
    {
        return Ok(plan);
    }
    if let Some(block) = fenced_json(trimmed)
        && let Ok(value) = serde_json::from_str::<Value>(block)
        && let Some(plan) = plan_from_json(&value, &thought)
    {
        return Ok(plan);
    }

    // Textual Action / Action Input form.
    if let Some(plan) = parse_textual_action(trimmed, &thought)? {
        return Ok(plan);
    }

    Err(AgentError::Parse(format!(
        "no action or final answer found in model output: {}",
        preview(trimmed)
    )))
}

fn plan_from_json(value: &Value, thought: &str) -> Option<ParsedPlan> {
    let obj = value.as_object()?;

    if let Some(answer) = obj.get("final_answer") {
        let text = match answer {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        return Some(ParsedPlan::Final { answer: text });
    }

    let tool_name = obj
        .get("tool_name")
        .or_else(|| obj.get("tool"))
        .and_then(Value::as_str)?;
    let input = obj
        .get("parameters")
        .or_else(|| obj.get("input"))
        .cloned()
        .unwrap_or(Value::Null);
    let thought = obj
        .get("thought")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| thought.to_string());

    Some(ParsedPlan::Act {
        thought,
        action: AgentAction {
            tool_name: tool_name.to_string(),
            input,
        },
    })
}

fn parse_textual_action(text: &str, thought: &str) -> Result<Option<ParsedPlan>, AgentError> {
    let Some(action_pos) = text.find("Action:") else {
        return Ok(None);
    };
    let after_action = &text[action_pos + "Action:".len()..];

    let (name_part, input_part) = match after_action.find("Action Input:") {
        Some(pos) => (
            &after_action[..pos],
            Some(&after_action[pos + "Action Input:".len()..]),
        ),
        None => (after_action, None),
    };

    let tool_name = name_part
        .lines()
        .next()
        .map(str::trim)
        .unwrap_or_default()
        .trim_matches(|c| c == '`' || c == '"')
        .to_string();
    if tool_name.is_empty() {
        return Err(AgentError::Parse("Action: marker with no tool name".into()));
    }

    let input = match input_part {
        Some(raw) => {
            let raw = raw.trim();
            let candidate = fenced_json(raw).unwrap_or(raw);
            serde_json::from_str(candidate)
                .unwrap_or_else(|_| Value::String(raw.to_string()))
        }
        None => Value::Null,
    };

    Ok(Some(ParsedPlan::Act {
        thought: thought.to_string(),
        action: AgentAction { tool_name, input },
    }))
}

fn extract_final_answer(text: &str) -> Option<String> {
    // An Action in the same message takes precedence only if it appears
    // before the final-answer marker; otherwise the conclusion wins.
    let pos = text.find("Final Answer:")?;
    if let Some(action_pos) = text.find("Action:")
        && action_pos < pos
    {
        return None;
    }
    let answer = text[pos + "Final Answer:".len()..].trim().to_string();
    Some(answer)
}

fn extract_thought(text: &str) -> String {
    // The thought ends where the action begins: an Action: marker, a code
    // fence, or an inline JSON object.
    fn boundary(s: &str) -> Option<usize> {
        ["Action:", "```", "{"].iter().filter_map(|m| s.find(m)).min()
    }

    if let Some(pos) = text.find("Thought:") {
        let after = &text[pos + "Thought:".len()..];
        let end = boundary(after).unwrap_or(after.len());
        return after[..end].trim().to_string();
    }
    // Prose before the first marker doubles as the thought.
    let end = boundary(text).unwrap_or(0);
    text[..end].trim().to_string()
}

/// Inner content of the first ```json fenced block, if any.
fn fenced_json(text: &str) -> Option<&str> {
    let start = text.find("```json")?;
    let after = &text[start + 7..];
    let end = after.find("```")?;
    Some(after[..end].trim())
}

fn preview(text: &str) -> String {
    let mut p: String = text.chars().take(120).collect();
    if p.len() < text.len() {
        p.push('…');
    }
    p
}
