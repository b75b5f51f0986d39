//! Recursive page indexing.
//!
//! Walks a page's block tree depth-first, following child pages and the
//! entries of embedded databases, and flattens everything it reaches into a
//! list of text sections.

use futures::future::{BoxFuture, FutureExt};
use notion_qa_core::AppResult;
use std::collections::HashSet;
use std::time::Instant;

use crate::client::NotionApi;
use crate::progress::ProgressReporter;
use crate::render::{is_inline_group, render_block};
use crate::types::{Block, IndexOptions, IndexedPage};

/// Separator between sections of the flattened document.
pub const SECTION_SEPARATOR: &str = "\n\n";

/// Index one page tree.
///
/// A page whose metadata cannot be read is still walked; only its title is
/// lost.
pub async fn index_page(
    api: &dyn NotionApi,
    page_id: &str,
    options: IndexOptions,
    progress: ProgressReporter,
) -> AppResult<IndexedPage> {
    let start = Instant::now();

    tracing::info!("Indexing Notion page {}", page_id);

    let title = match api.retrieve_page(page_id).await {
        Ok(page) => {
            let title = page.title();
            tracing::info!(
                "Accessed page: {}",
                title.as_deref().unwrap_or("Untitled")
            );
            title
        }
        Err(e) => {
            tracing::warn!(
                "Could not retrieve page properties ({}); block content will still be indexed",
                e
            );
            None
        }
    };

    let mut indexer = Indexer::new(api, options, progress);
    let sections = indexer.walk_blocks(page_id.to_string(), 0).await?;
    let content = sections.join(SECTION_SEPARATOR);

    let duration = start.elapsed();

    tracing::info!(
        "Indexed {} sections ({} sub-pages, {} bytes) in {:.2}s",
        sections.len(),
        indexer.pages_indexed,
        content.len(),
        duration.as_secs_f64()
    );

    Ok(IndexedPage {
        page_id: page_id.to_string(),
        title,
        sections,
        content,
        pages_indexed: indexer.pages_indexed,
        duration_secs: duration.as_secs_f64(),
    })
}

/// Paragraph-like blocks waiting to be joined into one section.
#[derive(Default)]
struct PendingGroup(Vec<String>);

impl PendingGroup {
    fn push(&mut self, text: String) {
        self.0.push(text);
    }

    fn flush_into(&mut self, sections: &mut Vec<String>) {
        if !self.0.is_empty() {
            sections.push(self.0.join(" "));
            self.0.clear();
        }
    }
}

/// State of one index run.
///
/// Block, page and database ids share one visited set, so every object is
/// fetched at most once even when pages link back to each other.
struct Indexer<'a> {
    api: &'a dyn NotionApi,
    options: IndexOptions,
    progress: ProgressReporter,
    visited: HashSet<String>,
    pages_indexed: u64,
}

impl<'a> Indexer<'a> {
    fn new(api: &'a dyn NotionApi, options: IndexOptions, progress: ProgressReporter) -> Self {
        Self {
            api,
            options,
            progress,
            visited: HashSet::new(),
            pages_indexed: 0,
        }
    }

    /// Whether pages nested below `depth` may still be entered.
    fn can_descend(&self, depth: u32) -> bool {
        self.options.max_depth.map_or(true, |max| depth < max)
    }

    /// Count a page the walk is about to enter.
    fn page_visited(&mut self, title: &str) {
        self.pages_indexed += 1;
        self.progress.page(self.pages_indexed, title);
    }

    /// Flatten the children of `block_id`, following nested blocks,
    /// child pages and child databases.
    ///
    /// API errors end this block's listing but keep what was gathered;
    /// transport errors abort the run.
    fn walk_blocks(&mut self, block_id: String, depth: u32) -> BoxFuture<'_, AppResult<Vec<String>>> {
        async move {
            if !self.visited.insert(block_id.clone()) {
                tracing::debug!(block_id = %block_id, "Already visited");
                return Ok(Vec::new());
            }

            let mut sections = Vec::new();
            let mut group = PendingGroup::default();
            let mut cursor: Option<String> = None;

            loop {
                let batch = match self
                    .api
                    .list_block_children(&block_id, cursor.as_deref(), self.options.page_size)
                    .await
                {
                    Ok(batch) => batch,
                    Err(e) if e.is_notion_api() => {
                        tracing::error!("Error fetching blocks for id {}: {}", block_id, e);
                        break;
                    }
                    Err(e) => return Err(e),
                };

                self.progress
                    .fetch(self.pages_indexed, &block_id, batch.results.len());

                for block in batch.results {
                    self.visit_block(block, depth, &mut group, &mut sections)
                        .await?;
                }

                group.flush_into(&mut sections);

                match batch.next_cursor {
                    Some(next) if batch.has_more => cursor = Some(next),
                    _ => break,
                }
            }

            Ok(sections)
        }
        .boxed()
    }

    async fn visit_block(
        &mut self,
        block: Block,
        depth: u32,
        group: &mut PendingGroup,
        sections: &mut Vec<String>,
    ) -> AppResult<()> {
        match block.kind.as_str() {
            "child_page" => {
                group.flush_into(sections);
                let title = block.body_str("title").unwrap_or("Untitled").to_string();
                sections.push(format!("\n### {}\n", title));

                if self.can_descend(depth) && !self.visited.contains(&block.id) {
                    self.page_visited(&title);
                    let child = self.walk_blocks(block.id, depth + 1).await?;
                    sections.extend(child);
                }
                return Ok(());
            }
            "child_database" => {
                group.flush_into(sections);
                let title = block.body_str("title").unwrap_or("Database").to_string();
                sections.push(format!("\n### Database: {}\n", title));

                if self.can_descend(depth) {
                    self.progress.database(self.pages_indexed, &title);
                    let entries = self.walk_database(block.id, depth + 1).await;
                    sections.extend(entries);
                }
                return Ok(());
            }
            _ => {}
        }

        if let Some(rendered) = render_block(&block) {
            if is_inline_group(&block.kind) {
                group.push(rendered);
            } else {
                group.flush_into(sections);
                sections.push(rendered);
            }
        }

        // Nested content (toggles, columns, synced blocks) stays on the
        // same page depth.
        if block.has_children {
            group.flush_into(sections);
            let nested = self.walk_blocks(block.id, depth).await?;
            sections.extend(nested);
        }

        Ok(())
    }

    /// Flatten every entry of a database. Entries sit at `depth`.
    ///
    /// Any failure ends the database walk and keeps the entries gathered so
    /// far; a broken database never aborts the page.
    fn walk_database(&mut self, database_id: String, depth: u32) -> BoxFuture<'_, Vec<String>> {
        async move {
            let mut sections = Vec::new();

            if !self.visited.insert(database_id.clone()) {
                return sections;
            }

            let mut cursor: Option<String> = None;

            'pages: loop {
                let batch = match self
                    .api
                    .query_database(&database_id, cursor.as_deref(), self.options.page_size)
                    .await
                {
                    Ok(batch) => batch,
                    Err(e) => {
                        tracing::error!("Error fetching database entries for {}: {}", database_id, e);
                        break;
                    }
                };

                for entry in batch.results {
                    let title = entry.title().unwrap_or_else(|| "Untitled".to_string());
                    sections.push(format!("\n#### {}\n", title));
                    if self.visited.contains(&entry.id) {
                        continue;
                    }
                    self.page_visited(&title);

                    match self.walk_blocks(entry.id, depth).await {
                        Ok(blocks) => sections.extend(blocks),
                        Err(e) => {
                            tracing::error!("Error fetching database entries for {}: {}", database_id, e);
                            break 'pages;
                        }
                    }
                }

                match batch.next_cursor {
                    Some(next) if batch.has_more => cursor = Some(next),
                    _ => break,
                }
            }

            sections
        }
        .boxed()
    }
}
