//! # skillforge Skills
//!
//! The knowledge side of the agent core: lexical relevance matching over
//! the skill catalog, budget-bounded knowledge compression, session-scoped
//! caching with duplicate-injection tracking, and lazy federation of
//! auxiliary skill documents.

pub mod cache;
pub mod compress;
pub mod federation;
pub mod index;
pub mod intent;
pub mod sections;

pub use cache::{ClearedCounts, SessionKnowledgeCache};
pub use compress::{CompressOptions, KnowledgeCompressor};
pub use federation::KnowledgeFederation;
pub use index::{SkillIndex, SynonymMap, default_synonyms};
pub use intent::{QueryIntent, classify_intent};
