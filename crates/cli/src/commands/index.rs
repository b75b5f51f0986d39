//! Index command handler.
//!
//! Prints the flattened text of a page tree exactly as the model would see
//! it.

use clap::Args;
use notion_qa_core::{config::AppConfig, AppResult};

use super::{index_with_progress, notion_client, NO_CONTENT};

/// Index a Notion page and print its flattened content
#[derive(Args, Debug)]
pub struct IndexCommand {
    /// Notion page URL (or page id)
    pub url: String,

    /// Output the indexed page as JSON
    #[arg(long)]
    pub json: bool,

    /// Maximum sub-page depth to follow (default: unlimited)
    #[arg(long)]
    pub max_depth: Option<u32>,
}

impl IndexCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing index command for {}", self.url);

        let notion = notion_client(config)?;
        let page = index_with_progress(&notion, config, &self.url, self.max_depth).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&page)?);
            return Ok(());
        }

        if page.is_empty() {
            eprintln!("{}", NO_CONTENT);
        } else {
            println!("{}", page.content);
        }

        eprintln!(
            "Indexed '{}': {} sub-pages, {} sections in {:.2}s",
            page.display_title(),
            page.pages_indexed,
            page.sections.len(),
            page.duration_secs
        );

        Ok(())
    }
}
