//! LLM integration crate for the Notion QA CLI.
//!
//! This crate provides a provider-agnostic abstraction for sending the
//! indexed page plus a question to a hosted Large Language Model.
//!
//! # Providers
//! - **Gemini**: Google Generative Language API (default)
//! - **OpenAI**: Chat Completions API
//!
//! # Example
//! ```no_run
//! use notion_qa_llm::{LlmClient, LlmRequest, providers::GeminiClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = GeminiClient::new("api-key");
//! let request = LlmRequest::new("Hello, world!", "gemini-2.0-flash-exp");
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;
pub mod sse;
pub mod types;

// Re-export main types
pub use client::{LlmClient, LlmRequest, LlmResponse, LlmStream, LlmStreamChunk, LlmUsage};
pub use factory::create_client;
pub use providers::{GeminiClient, OpenAiClient};
pub use types::ProviderType;
