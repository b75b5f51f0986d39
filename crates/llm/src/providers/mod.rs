//! Hosted LLM provider implementations.

pub mod gemini;
pub mod openai;

pub use gemini::GeminiClient;
pub use openai::OpenAiClient;

use crate::client::{LlmStreamChunk, LlmUsage};
use futures::StreamExt;
use notion_qa_core::{AppError, AppResult};
use std::sync::{Arc, Mutex};

/// Turn a non-success HTTP response into an `AppError::Llm`.
pub(crate) async fn check_status(
    provider: &str,
    response: reqwest::Response,
) -> AppResult<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let error_text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());

    Err(AppError::Llm(format!(
        "{} API error ({}): {}",
        provider, status, error_text
    )))
}

/// Drop empty chunks and append a final `done` chunk carrying the last
/// usage statistics seen on the stream.
pub(crate) fn finish_stream<S>(
    chunks: S,
    model: String,
) -> impl futures::Stream<Item = AppResult<LlmStreamChunk>> + Send
where
    S: futures::Stream<Item = AppResult<LlmStreamChunk>> + Send + 'static,
{
    let usage = Arc::new(Mutex::new(None::<LlmUsage>));
    let usage_seen = usage.clone();

    let body = chunks.map(move |item| {
        if let Ok(ref chunk) = item {
            if let Some(ref u) = chunk.usage {
                if let Ok(mut slot) = usage_seen.lock() {
                    *slot = Some(u.clone());
                }
            }
        }
        item
    });

    let tail = futures::stream::once(async move {
        let usage = usage.lock().ok().and_then(|mut slot| slot.take());
        Ok(LlmStreamChunk {
            content: String::new(),
            model,
            done: true,
            usage,
        })
    });

    body.filter(|item| {
        futures::future::ready(match item {
            Ok(chunk) => !chunk.content.is_empty(),
            Err(_) => true,
        })
    })
    .chain(tail)
}
