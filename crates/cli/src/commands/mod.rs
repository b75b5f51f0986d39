//! Command handlers for the Notion QA CLI.
//!
//! This module organizes all CLI commands into separate submodules, plus the
//! plumbing they share: Notion and LLM client setup, progress display and
//! answer delivery.

pub mod ask;
pub mod chat;
pub mod index;
pub mod prompts;

// Re-export command types for convenience
pub use ask::AskCommand;
pub use chat::ChatCommand;
pub use index::IndexCommand;
pub use prompts::PromptsCommand;

use futures::StreamExt;
use notion_qa_core::{config::AppConfig, AppError, AppResult};
use notion_qa_llm::{create_client, LlmClient, LlmRequest, LlmUsage};
use notion_qa_notion::{
    IndexOptions, IndexedPage, NotionApi, NotionClient, ProgressEvent, ProgressReporter,
};
use notion_qa_prompt::BuiltPrompt;
use std::io::Write;
use std::sync::Arc;

/// Message shown when a page tree yields no text.
pub const NO_CONTENT: &str = "No content found in the page.";

/// Create the Notion client from the configured token.
pub fn notion_client(config: &AppConfig) -> AppResult<NotionClient> {
    let token = config.resolve_notion_token()?;
    Ok(NotionClient::from_config(&config.notion, token))
}

pub fn index_options(config: &AppConfig, max_depth: Option<u32>) -> IndexOptions {
    IndexOptions {
        page_size: config.notion.page_size,
        max_depth,
    }
}

/// Reporter that keeps an `Indexed pages: N` counter updated on stderr.
pub fn stderr_progress() -> ProgressReporter {
    ProgressReporter::new(Arc::new(|event: ProgressEvent| {
        if event.phase == "page" {
            eprint!("\rIndexed pages: {}", event.current);
            std::io::stderr().flush().ok();
        }
    }))
}

/// Index a page with the stderr counter, ending the counter line afterwards.
pub async fn index_with_progress(
    api: &dyn NotionApi,
    config: &AppConfig,
    url: &str,
    max_depth: Option<u32>,
) -> AppResult<IndexedPage> {
    let page = notion_qa_notion::index_url(
        api,
        url,
        index_options(config, max_depth),
        stderr_progress(),
    )
    .await?;

    if page.pages_indexed > 0 {
        eprintln!();
    }

    Ok(page)
}

/// Fail with [`NO_CONTENT`] when indexing produced no text.
pub fn require_content(page: &IndexedPage) -> AppResult<&IndexedPage> {
    if page.is_empty() {
        return Err(AppError::Other(NO_CONTENT.to_string()));
    }
    Ok(page)
}

/// Create the LLM client for the active provider.
pub fn llm_client(config: &AppConfig) -> AppResult<Arc<dyn LlmClient>> {
    let endpoint = config.provider_endpoint(&config.provider);
    let api_key = config.resolve_api_key(&config.provider);
    let organization = config.resolve_organization(&config.provider);

    create_client(
        &config.provider,
        endpoint.as_deref(),
        api_key.as_deref(),
        organization.as_deref(),
    )
    .map_err(AppError::Config)
}

/// Generation settings shared by `ask` and `chat`.
#[derive(Debug, Clone, Default)]
pub struct GenerationOptions {
    pub stream: bool,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

pub fn build_request(
    prompt: BuiltPrompt,
    model: &str,
    options: &GenerationOptions,
) -> LlmRequest {
    let mut request = LlmRequest::new(prompt.user, model);

    if let Some(system) = prompt.system {
        request = request.with_system(system);
    }

    if let Some(max_tokens) = options.max_tokens {
        request = request.with_max_tokens(max_tokens);
    }

    if let Some(temperature) = options.temperature {
        request = request.with_temperature(temperature);
    }

    if options.stream {
        request = request.with_streaming();
    }

    request
}

/// A finished answer.
#[derive(Debug)]
pub struct Answer {
    pub content: String,
    pub model: String,
    pub usage: Option<LlmUsage>,
}

impl Answer {
    pub fn usage_json(&self) -> serde_json::Value {
        let usage = self.usage.clone().unwrap_or_default();
        serde_json::json!({
            "promptTokens": usage.prompt_tokens,
            "completionTokens": usage.completion_tokens,
            "totalTokens": usage.total_tokens
        })
    }
}

/// Send the request and collect the answer.
///
/// With `echo` the answer is written to stdout as it arrives (chunk by chunk
/// when streaming).
pub async fn run_query(
    client: &dyn LlmClient,
    request: &LlmRequest,
    echo: bool,
) -> AppResult<Answer> {
    if !request.stream {
        tracing::info!("Sending non-streaming request to LLM");

        let response = client.complete(request).await?;
        if !response.done {
            tracing::warn!("Answer was cut off by the token limit");
        }
        if echo {
            println!("{}", response.content);
        }

        return Ok(Answer {
            content: response.content,
            model: response.model,
            usage: Some(response.usage),
        });
    }

    tracing::info!("Starting streaming request to LLM");

    let mut stream = client.stream(request).await?;
    let mut content = String::new();
    let mut model = request.model.clone();
    let mut usage = None;

    while let Some(result) = stream.next().await {
        let chunk = result?;

        if !chunk.content.is_empty() {
            content.push_str(&chunk.content);

            if echo {
                print!("{}", chunk.content);
                std::io::stdout().flush().ok();
            }
        }

        if chunk.done {
            model = chunk.model;
            usage = chunk.usage;
            break;
        }
    }

    if echo {
        println!();
    }

    // Same shape as a non-streamed answer, which providers trim
    Ok(Answer {
        content: content.trim().to_string(),
        model,
        usage,
    })
}

/// Log token usage at debug level.
pub fn log_usage(answer: &Answer) {
    if let Some(ref usage) = answer.usage {
        tracing::debug!(
            "Token usage - Prompt: {}, Completion: {}, Total: {}",
            usage.prompt_tokens,
            usage.completion_tokens,
            usage.total_tokens
        );
    }
}
