//! Shared fixtures for indexer tests.


use notion_qa_core::{AppError, AppResult};
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use crate::client::NotionApi;
use crate::types::{Block, PaginatedList, Page};

/// In-memory Notion workspace.
///
/// Block children and database entries are served in batches; batch `n`
/// is requested with the cursor `cursor-n`. Unknown blocks have no children.
#[derive(Default)]
pub(crate) struct FakeNotion {
    pages: HashMap<String, Page>,
    blocks: HashMap<String, Vec<Vec<Block>>>,
    databases: HashMap<String, Vec<Vec<Page>>>,
    api_failures: HashSet<String>,
    transport_failures: HashSet<String>,
    calls: Mutex<Vec<String>>,
}

impl FakeNotion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, id: &str, title: &str) -> Self {
        self.pages.insert(id.to_string(), titled_page(id, title));
        self
    }

    pub fn blocks(self, id: &str, blocks: Vec<Block>) -> Self {
        self.block_batches(id, vec![blocks])
    }

    pub fn block_batches(mut self, id: &str, batches: Vec<Vec<Block>>) -> Self {
        self.blocks.insert(id.to_string(), batches);
        self
    }

    pub fn database(mut self, id: &str, batches: Vec<Vec<Page>>) -> Self {
        self.databases.insert(id.to_string(), batches);
        self
    }

    /// Requests for `id` get a Notion API error response.
    pub fn api_failure(mut self, id: &str) -> Self {
        self.api_failures.insert(id.to_string());
        self
    }

    /// Requests for `id` fail before reaching the API.
    pub fn transport_failure(mut self, id: &str) -> Self {
        self.transport_failures.insert(id.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn check_failure(&self, id: &str) -> AppResult<()> {
        if self.transport_failures.contains(id) {
            return Err(AppError::Notion(
                "Failed to reach Notion: connection reset".to_string(),
            ));
        }
        if self.api_failures.contains(id) {
            return Err(AppError::NotionApi {
                status: 404,
                code: "object_not_found".to_string(),
                message: format!("Could not find block with ID: {}.", id),
            });
        }
        Ok(())
    }
}

fn batch_index(cursor: Option<&str>) -> usize {
    cursor
        .and_then(|c| c.strip_prefix("cursor-"))
        .and_then(|n| n.parse().ok())
        .unwrap_or(0)
}

fn batch_of<T: Clone>(batches: Option<&Vec<Vec<T>>>, cursor: Option<&str>) -> PaginatedList<T> {
    let Some(batches) = batches else {
        return PaginatedList::last(Vec::new());
    };

    let index = batch_index(cursor);
    let results = batches.get(index).cloned().unwrap_or_default();
    let has_more = index + 1 < batches.len();

    PaginatedList {
        results,
        next_cursor: has_more.then(|| format!("cursor-{}", index + 1)),
        has_more,
    }
}

#[async_trait::async_trait]
impl NotionApi for FakeNotion {
    async fn retrieve_page(&self, page_id: &str) -> AppResult<Page> {
        self.record(format!("page:{}", page_id));
        self.pages.get(page_id).cloned().ok_or_else(|| AppError::NotionApi {
            status: 404,
            code: "object_not_found".to_string(),
            message: format!("Could not find page with ID: {}.", page_id),
        })
    }

    async fn list_block_children(
        &self,
        block_id: &str,
        start_cursor: Option<&str>,
        _page_size: u32,
    ) -> AppResult<PaginatedList<Block>> {
        self.record(format!("blocks:{}:{}", block_id, start_cursor.unwrap_or("-")));
        self.check_failure(block_id)?;
        Ok(batch_of(self.blocks.get(block_id), start_cursor))
    }

    async fn query_database(
        &self,
        database_id: &str,
        start_cursor: Option<&str>,
        _page_size: u32,
    ) -> AppResult<PaginatedList<Page>> {
        self.record(format!("query:{}:{}", database_id, start_cursor.unwrap_or("-")));
        self.check_failure(database_id)?;
        Ok(batch_of(self.databases.get(database_id), start_cursor))
    }
}

pub(crate) fn paragraph(id: &str, text: &str) -> Block {
    rich(id, "paragraph", text)
}

pub(crate) fn rich(id: &str, kind: &str, text: &str) -> Block {
    Block::new(id, kind, json!({"rich_text": [{"plain_text": text}]}))
}

pub(crate) fn child_page(id: &str, title: &str) -> Block {
    Block::new(id, "child_page", json!({"title": title})).with_children()
}

pub(crate) fn child_database(id: &str, title: &str) -> Block {
    Block::new(id, "child_database", json!({"title": title}))
}

pub(crate) fn titled_page(id: &str, title: &str) -> Page {
    Page {
        id: id.to_string(),
        properties: json!({
            "Name": {"type": "title", "title": [{"plain_text": title}]}
        })
        .as_object()
        .cloned()
        .unwrap_or_default(),
    }
}

pub(crate) fn untitled_page(id: &str) -> Page {
    Page {
        id: id.to_string(),
        properties: serde_json::Map::new(),
    }
}
