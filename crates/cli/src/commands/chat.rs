//! Chat command handler.
//!
//! Interactive loop over one page. Every question is sent on its own with
//! the indexed page as context; earlier questions and answers are never
//! replayed to the model. The indexed page itself is kept for the session
//! unless `--fresh` is given.

use clap::Args;
use notion_qa_core::{config::AppConfig, AppError, AppResult};
use notion_qa_llm::LlmClient;
use notion_qa_notion::{ContentCache, IndexedPage, NotionApi};
use notion_qa_prompt::{build_qa_prompt, load_prompt, PromptDefinition, DEFAULT_PROMPT_ID};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

use super::{
    build_request, index_with_progress, llm_client, log_usage, notion_client, require_content,
    run_query, Answer, GenerationOptions, NO_CONTENT,
};

/// Ask questions about a Notion page interactively
#[derive(Args, Debug)]
pub struct ChatCommand {
    /// Notion page URL (or page id)
    pub url: String,

    /// Re-index the page before every question
    #[arg(long)]
    pub fresh: bool,

    /// Disable streaming
    #[arg(long)]
    pub no_stream: bool,

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

/// One line of user input.
#[derive(Debug, PartialEq, Eq)]
enum ChatInput {
    Empty,
    Quit,
    Refresh,
    Open(String),
    Question(String),
}

fn parse_input(line: &str) -> ChatInput {
    let line = line.trim();

    match line {
        "" => ChatInput::Empty,
        ":quit" | ":q" | ":exit" => ChatInput::Quit,
        ":refresh" => ChatInput::Refresh,
        _ => match line.strip_prefix(":open") {
            Some(rest) if rest.starts_with(char::is_whitespace) && !rest.trim().is_empty() => {
                ChatInput::Open(rest.trim().to_string())
            }
            _ => ChatInput::Question(line.to_string()),
        },
    }
}

struct ChatSession<'a> {
    config: &'a AppConfig,
    notion: &'a dyn NotionApi,
    llm: &'a dyn LlmClient,
    prompt: PromptDefinition,
    model: String,
    options: GenerationOptions,
    max_depth: Option<u32>,
    fresh: bool,
    cache: ContentCache,
}

impl ChatSession<'_> {
    async fn index(&self, url: &str) -> AppResult<IndexedPage> {
        let page = index_with_progress(self.notion, self.config, url, self.max_depth).await?;
        tracing::info!(
            "Indexed '{}': {} sub-pages, {} chars",
            page.display_title(),
            page.pages_indexed,
            page.content.len()
        );
        Ok(page)
    }

    async fn ask(&mut self, url: &str, question: &str) -> AppResult<Answer> {
        // Fresh sessions never fill the cache
        let fresh_page;
        let page = if self.fresh {
            fresh_page = self.index(url).await?;
            &fresh_page
        } else {
            if self.cache.get(url).is_none() {
                let page = self.index(url).await?;
                self.cache.insert(url, page);
            } else {
                tracing::debug!("Using cached content for {}", url);
            }
            self.cache
                .get(url)
                .ok_or_else(|| AppError::Other(NO_CONTENT.to_string()))?
        };
        require_content(page)?;

        let built = build_qa_prompt(&self.prompt, &page.content, question)?;
        let request = build_request(built, &self.model, &self.options);

        let answer = run_query(self.llm, &request, true).await?;
        log_usage(&answer);

        Ok(answer)
    }

    /// Forget the cached page for `url` and say what happened.
    fn refresh(&mut self, url: &str) -> &'static str {
        if self.fresh {
            "Nothing to clear; --fresh re-indexes the page for every question."
        } else if self.cache.invalidate(url) {
            "Cleared cached content; the page is re-indexed on the next question."
        } else {
            "Nothing cached yet."
        }
    }
}

impl ChatCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing chat command for {}", self.url);

        let llm = llm_client(config)?;
        let notion = notion_client(config)?;

        let mut session = ChatSession {
            config,
            notion: &notion,
            llm: llm.as_ref(),
            prompt: load_prompt(&config.workspace, &self.prompt_id)?,
            model: config.effective_model()?,
            options: GenerationOptions {
                stream: !self.no_stream,
                max_tokens: self.max_tokens,
                temperature: self.temperature,
            },
            max_depth: self.max_depth,
            fresh: self.fresh,
            cache: ContentCache::new(),
        };

        let mut url = self.url.trim().to_string();
        eprintln!(
            "Asking about {}\nCommands: :refresh re-indexes the page, :open <url> switches pages, :quit exits.",
            url
        );

        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            print!("\n> ");
            std::io::stdout().flush().ok();

            let Some(line) = lines.next_line().await? else {
                println!();
                break;
            };

            match parse_input(&line) {
                ChatInput::Empty => continue,
                ChatInput::Quit => break,
                ChatInput::Refresh => eprintln!("{}", session.refresh(&url)),
                ChatInput::Open(next) => {
                    url = next;
                    eprintln!("Now asking about {}", url);
                }
                ChatInput::Question(question) => {
                    if let Err(e) = session.ask(&url, &question).await {
                        tracing::error!("Question failed: {}", e);
                        eprintln!("Error: {}", e);
                    }
                }
            }
        }

        tracing::info!("Chat ended ({} pages cached)", session.cache.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{FakeLlm, FakeNotion, PAGE_URL};
    use notion_qa_prompt::default_prompt;

    fn session<'a>(
        config: &'a AppConfig,
        notion: &'a FakeNotion,
        llm: &'a FakeLlm,
        fresh: bool,
    ) -> ChatSession<'a> {
        ChatSession {
            config,
            notion,
            llm,
            prompt: default_prompt(),
            model: "m".to_string(),
            options: GenerationOptions {
                stream: false,
                max_tokens: None,
                temperature: None,
            },
            max_depth: None,
            fresh,
            cache: ContentCache::new(),
        }
    }

    #[tokio::test]
    async fn test_questions_reuse_indexed_page() {
        let config = AppConfig::default();
        let notion = FakeNotion::with_text("v2 ships in Q3");
        let llm = FakeLlm::new(vec!["In Q3."]);
        let mut chat = session(&config, &notion, &llm, false);

        chat.ask(PAGE_URL, "When does v2 ship?").await.unwrap();
        let answer = chat.ask(PAGE_URL, "Who owns it?").await.unwrap();

        assert_eq!(answer.content, "In Q3.");
        assert_eq!(notion.listings(), 1);
        assert_eq!(chat.cache.len(), 1);

        let prompts = llm.prompts();
        assert_eq!(prompts.len(), 2);
        assert!(prompts[1].contains("v2 ships in Q3"));
        assert!(prompts[1].contains("Question: Who owns it?"));
        // Earlier turns are not replayed
        assert!(!prompts[1].contains("When does v2 ship?"));
    }

    #[tokio::test]
    async fn test_fresh_session_indexes_every_question() {
        let config = AppConfig::default();
        let notion = FakeNotion::with_text("v2 ships in Q3");
        let llm = FakeLlm::new(vec!["In Q3."]);
        let mut chat = session(&config, &notion, &llm, true);

        chat.ask(PAGE_URL, "One?").await.unwrap();
        chat.ask(PAGE_URL, "Two?").await.unwrap();

        assert_eq!(notion.listings(), 2);
        assert!(chat.cache.is_empty());
        assert_eq!(
            chat.refresh(PAGE_URL),
            "Nothing to clear; --fresh re-indexes the page for every question."
        );
    }

    #[tokio::test]
    async fn test_refresh_reindexes_next_question() {
        let config = AppConfig::default();
        let notion = FakeNotion::with_text("v2 ships in Q3");
        let llm = FakeLlm::new(vec!["In Q3."]);
        let mut chat = session(&config, &notion, &llm, false);

        assert_eq!(chat.refresh(PAGE_URL), "Nothing cached yet.");

        chat.ask(PAGE_URL, "One?").await.unwrap();
        assert_eq!(
            chat.refresh(PAGE_URL),
            "Cleared cached content; the page is re-indexed on the next question."
        );
        chat.ask(PAGE_URL, "Two?").await.unwrap();

        assert_eq!(notion.listings(), 2);
    }

    #[tokio::test]
    async fn test_empty_page_is_an_error() {
        let config = AppConfig::default();
        let notion = FakeNotion::empty();
        let llm = FakeLlm::new(vec!["unused"]);
        let mut chat = session(&config, &notion, &llm, false);

        let err = chat.ask(PAGE_URL, "Anything?").await.err().unwrap();

        assert_eq!(err.to_string(), NO_CONTENT);
        assert!(llm.prompts().is_empty());

        // The empty page stays cached, so asking again does not refetch
        chat.ask(PAGE_URL, "Anything else?").await.err().unwrap();
        assert_eq!(notion.listings(), 1);
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_input("   "), ChatInput::Empty);
        assert_eq!(parse_input(":quit"), ChatInput::Quit);
        assert_eq!(parse_input(" :q "), ChatInput::Quit);
        assert_eq!(parse_input(":refresh"), ChatInput::Refresh);
        assert_eq!(
            parse_input(":open https://notion.so/acme/Docs-abc"),
            ChatInput::Open("https://notion.so/acme/Docs-abc".to_string())
        );
    }

    #[test]
    fn test_parse_questions() {
        assert_eq!(
            parse_input("  What ships in Q3? "),
            ChatInput::Question("What ships in Q3?".to_string())
        );
        // Not a command without an argument
        assert_eq!(
            parse_input(":open"),
            ChatInput::Question(":open".to_string())
        );
        assert_eq!(
            parse_input(":opener"),
            ChatInput::Question(":opener".to_string())
        );
    }
}
