//! Notion page retrieval and flattening.
//!
//! Resolves a page URL to its id, walks the page tree through the Notion
//! API (sub-pages, nested blocks and database entries) and renders it as
//! plain text ready for a language model.

pub mod cache;
pub mod client;
pub mod indexer;
pub mod page_id;
pub mod progress;
pub mod render;
pub mod types;

#[cfg(test)]
mod tests;

pub use cache::ContentCache;
pub use client::{NotionApi, NotionClient, DEFAULT_NOTION_ENDPOINT, DEFAULT_NOTION_VERSION};
pub use indexer::index_page;
pub use page_id::extract_page_id;
pub use progress::{ProgressCallback, ProgressEvent, ProgressReporter};
pub use types::{Block, IndexOptions, IndexedPage, Page, PaginatedList};

use notion_qa_core::AppResult;

/// Resolve `url` to a page id and index the page tree behind it.
pub async fn index_url(
    api: &dyn NotionApi,
    url: &str,
    options: IndexOptions,
    progress: ProgressReporter,
) -> AppResult<IndexedPage> {
    let page_id = extract_page_id(url)?;
    tracing::debug!(url, page_id = %page_id, "Resolved page id");
    index_page(api, &page_id, options, progress).await
}
