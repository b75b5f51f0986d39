//! Fakes for command tests.

use futures::stream;
use notion_qa_core::{AppError, AppResult};
use notion_qa_llm::{LlmClient, LlmRequest, LlmResponse, LlmStream, LlmStreamChunk, LlmUsage};
use notion_qa_notion::{Block, NotionApi, Page, PaginatedList};
use std::sync::Mutex;

/// Page URL whose id every fake lookup accepts.
pub(crate) const PAGE_URL: &str =
    "https://www.notion.so/acme/Roadmap-9f1c2b3a4d5e6f708192a3b4c5d6e7f8";

/// Replies with fixed chunks.
pub(crate) struct FakeLlm {
    pub chunks: Vec<&'static str>,
    pub prompts: Mutex<Vec<String>>,
}

impl FakeLlm {
    pub fn new(chunks: Vec<&'static str>) -> Self {
        Self {
            chunks,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl LlmClient for FakeLlm {
    fn provider_name(&self) -> &str {
        "fake"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        self.prompts.lock().unwrap().push(request.prompt.clone());
        Ok(LlmResponse {
            content: self.chunks.concat(),
            model: request.model.clone(),
            usage: LlmUsage::new(10, 2),
            done: true,
        })
    }

    async fn stream(&self, request: &LlmRequest) -> AppResult<LlmStream> {
        self.prompts.lock().unwrap().push(request.prompt.clone());
        let model = request.model.clone();
        let mut items: Vec<AppResult<LlmStreamChunk>> = self
            .chunks
            .iter()
            .map(|c| {
                Ok(LlmStreamChunk {
                    content: c.to_string(),
                    model: model.clone(),
                    done: false,
                    usage: None,
                })
            })
            .collect();
        items.push(Ok(LlmStreamChunk {
            content: String::new(),
            model: "fake-model-002".to_string(),
            done: true,
            usage: Some(LlmUsage::new(7, 3)),
        }));
        Ok(Box::pin(stream::iter(items)))
    }
}

/// A workspace where every page holds one paragraph (or nothing).
///
/// Counts block listings so tests can tell a fresh index from a cached one.
pub(crate) struct FakeNotion {
    text: Option<&'static str>,
    listings: Mutex<u32>,
}

impl FakeNotion {
    pub fn with_text(text: &'static str) -> Self {
        Self {
            text: Some(text),
            listings: Mutex::new(0),
        }
    }

    pub fn empty() -> Self {
        Self {
            text: None,
            listings: Mutex::new(0),
        }
    }

    pub fn listings(&self) -> u32 {
        *self.listings.lock().unwrap()
    }
}

#[async_trait::async_trait]
impl NotionApi for FakeNotion {
    async fn retrieve_page(&self, page_id: &str) -> AppResult<Page> {
        Err(AppError::NotionApi {
            status: 404,
            code: "object_not_found".to_string(),
            message: format!("Could not find page with ID: {}.", page_id),
        })
    }

    async fn list_block_children(
        &self,
        block_id: &str,
        _start_cursor: Option<&str>,
        _page_size: u32,
    ) -> AppResult<PaginatedList<Block>> {
        *self.listings.lock().unwrap() += 1;

        let blocks = self
            .text
            .map(|text| {
                vec![Block::new(
                    format!("{}-p", block_id),
                    "paragraph",
                    serde_json::json!({"rich_text": [{"plain_text": text}]}),
                )]
            })
            .unwrap_or_default();

        Ok(PaginatedList::last(blocks))
    }

    async fn query_database(
        &self,
        _database_id: &str,
        _start_cursor: Option<&str>,
        _page_size: u32,
    ) -> AppResult<PaginatedList<Page>> {
        Ok(PaginatedList::last(Vec::new()))
    }
}
