//! Ask command handler.
//!
//! Indexes a Notion page tree from scratch and asks the model one question
//! about it. Nothing is reused between runs.

use clap::Args;
use notion_qa_core::{config::AppConfig, AppError, AppResult};
use notion_qa_llm::LlmClient;
use notion_qa_notion::{IndexedPage, NotionApi};
use notion_qa_prompt::{build_qa_prompt, load_prompt, DEFAULT_PROMPT_ID};

use super::{
    build_request, index_with_progress, llm_client, log_usage, notion_client, require_content,
    run_query, Answer, GenerationOptions,
};

/// Ask a question about a Notion page
#[derive(Args, Debug)]
pub struct AskCommand {
    /// Notion page URL (or page id)
    pub url: String,

    /// The question to ask
    pub question: String,

    /// Disable streaming
    #[arg(long)]
    pub no_stream: bool,

    /// Print the indexed content to stderr before the answer
    #[arg(long)]
    pub show_content: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Prompt to use (see `notion-qa prompts`)
    #[arg(long, default_value = DEFAULT_PROMPT_ID)]
    pub prompt_id: String,

    /// Maximum tokens in response
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// Temperature for response generation (0.0-2.0)
    #[arg(long)]
    pub temperature: Option<f32>,

    /// Maximum sub-page depth to follow (default: unlimited)
    #[arg(long)]
    pub max_depth: Option<u32>,
}

/// Result of one `ask` run.
pub struct AskOutcome {
    pub page: IndexedPage,
    pub answer: Answer,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");
        tracing::debug!("Ask command options: {:?}", self);

        // Fail on configuration problems before spending time on Notion
        let llm = llm_client(config)?;
        let notion = notion_client(config)?;

        let outcome = self.run(config, &notion, llm.as_ref()).await?;

        if self.json {
            let output = serde_json::json!({
                "answer": outcome.answer.content,
                "model": outcome.answer.model,
                "provider": config.provider,
                "pageId": outcome.page.page_id,
                "pagesIndexed": outcome.page.pages_indexed,
                "usage": outcome.answer.usage_json()
            });

            let json = serde_json::to_string_pretty(&output)?;
            println!("{}", json);
        }

        log_usage(&outcome.answer);

        Ok(())
    }

    /// Index the page from scratch and answer the question.
    pub async fn run(
        &self,
        config: &AppConfig,
        notion: &dyn NotionApi,
        llm: &dyn LlmClient,
    ) -> AppResult<AskOutcome> {
        if self.question.trim().is_empty() {
            return Err(AppError::Config("No question provided".to_string()));
        }

        let prompt_def = load_prompt(&config.workspace, &self.prompt_id)?;
        let model = config.effective_model()?;

        let page = index_with_progress(notion, config, &self.url, self.max_depth).await?;
        require_content(&page)?;

        tracing::info!(
            "Indexed '{}': {} sub-pages, {} chars",
            page.display_title(),
            page.pages_indexed,
            page.content.len()
        );

        if self.show_content {
            eprintln!("--- Indexed content ---\n{}\n--- End of content ---", page.content);
        }

        let built = build_qa_prompt(&prompt_def, &page.content, &self.question)?;
        tracing::debug!(
            "Built prompt {} ({} chars)",
            built.metadata.source_prompt_id,
            built.metadata.user_chars
        );

        let options = GenerationOptions {
            stream: !self.no_stream,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };
        let request = build_request(built, &model, &options);

        let answer = run_query(llm, &request, !self.json).await?;

        Ok(AskOutcome { page, answer })
    }
}
