//! # skillforge Providers
//!
//! Clients for the completion service behind
//! [`skillforge_core::CompletionProvider`].

pub mod openai_compat;

pub use openai_compat::OpenAiCompatProvider;
