//! # skillforge Core
//!
//! Domain types, traits, and error definitions for the skillforge agent
//! core. This crate defines the domain model that all other crates
//! implement against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator is defined as a trait here — the completion
//! service and the tool backends. Implementations live in their respective
//! crates, which keeps the dependency graph pointing inward and makes every
//! seam mockable in tests.

pub mod completion;
pub mod error;
pub mod knowledge;
pub mod observation;
pub mod query;
pub mod skill;
pub mod tool;
pub mod transcript;

// Re-export key types at crate root for ergonomics
pub use completion::{
    ChatMessage, CompletionProvider, CompletionRequest, CompletionResponse, Role, Usage,
};
pub use error::{AgentError, CompletionError, Error, Result, SkillError, ToolError};
pub use knowledge::{CompressedKnowledge, CompressionLevel, LevelChoice};
pub use observation::{NormalizedResponse, Source};
pub use query::{InvocationMode, QueryContext, ResearchMode};
pub use skill::{RelevanceMatch, SkillCatalog, SkillDocument};
pub use tool::ToolService;
pub use transcript::{AgentAction, Transcript, TranscriptStep};
