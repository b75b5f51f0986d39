//! Prompts command handler.

use clap::Args;
use notion_qa_core::{config::AppConfig, AppResult};
use notion_qa_prompt::{list_prompts, load_prompt};

/// List available prompts
#[derive(Args, Debug)]
pub struct PromptsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl PromptsCommand {
    pub fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing prompts command");

        let ids = list_prompts(&config.workspace)?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&ids)?);
            return Ok(());
        }

        for id in ids {
            match load_prompt(&config.workspace, &id) {
                Ok(prompt) => println!("{}  {}", id, prompt.title),
                Err(e) => println!("{}  (invalid: {})", id, e),
            }
        }

        Ok(())
    }
}
