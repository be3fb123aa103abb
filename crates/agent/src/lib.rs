//! # skillforge Agent
//!
//! The reasoning loop: plan with the completion model, act through the
//! tool adapter, observe, repeat. Skill knowledge is matched, compressed,
//! and injected per turn through the session cache.

pub mod loop_runner;
pub mod parser;
pub mod prompt;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use loop_runner::{AgentConfig, AgentLoop, RunOutcome, RunState};
pub use parser::{parse_plan, ParsedPlan};
