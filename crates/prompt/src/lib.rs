//! Prompt system for the Notion QA CLI.
//!
//! This crate provides structured prompt management with:
//! - A built-in question-answering prompt
//! - YAML-based prompt definitions that can replace it per workspace
//! - Handlebars template rendering

pub mod builder;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::{build_prompt, build_qa_prompt};
pub use loader::{default_prompt, list_prompts, load_prompt, DEFAULT_PROMPT_ID};
pub use types::{BuiltPrompt, BuiltPromptMetadata, PromptDefinition, PromptOutputSpec};
