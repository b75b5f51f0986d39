//! Notion QA CLI
//!
//! Main entry point for the notion-qa command-line tool.
//! Indexes a Notion page tree and answers questions about it with an LLM.

mod commands;

#[cfg(test)]
mod tests;

use clap::{Parser, Subcommand};
use commands::{AskCommand, ChatCommand, IndexCommand, PromptsCommand};
use notion_qa_core::{config::AppConfig, logging, AppResult};
use std::path::PathBuf;

/// Notion QA - ask an LLM questions about a Notion page and everything under it
#[derive(Parser, Debug)]
#[command(name = "notion-qa")]
#[command(about = "Ask questions about a Notion page, its sub-pages and databases", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "NOTION_QA_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file (default: .notion-qa/config.yaml)
    #[arg(short, long, global = true, env = "NOTION_QA_CONFIG")]
    config: Option<PathBuf>,

    /// Log level or filter (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// LLM provider (gemini, openai)
    #[arg(short, long, global = true, env = "NOTION_QA_PROVIDER")]
    provider: Option<String>,

    /// Model identifier
    #[arg(short, long, global = true, env = "NOTION_QA_MODEL")]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ask one question about a page
    Ask(AskCommand),

    /// Index a page and print the flattened content
    Index(IndexCommand),

    /// Ask questions interactively
    Chat(ChatCommand),

    /// List available prompts
    Prompts(PromptsCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    // Defaults, config file, then environment
    let config = AppConfig::load_with(cli.workspace, cli.config)?;

    // Apply CLI overrides
    let config = config.with_overrides(
        cli.provider,
        cli.model,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    // Initialize logging with final configuration
    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    tracing::info!("Notion QA CLI starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Provider: {}", config.provider);
    tracing::debug!("Model: {:?}", config.model);

    config.validate()?;

    let command_name = match &cli.command {
        Commands::Ask(_) => "ask",
        Commands::Index(_) => "index",
        Commands::Chat(_) => "chat",
        Commands::Prompts(_) => "prompts",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    // Route to command handlers
    let result = match cli.command {
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Index(cmd) => cmd.execute(&config).await,
        Commands::Chat(cmd) => cmd.execute(&config).await,
        Commands::Prompts(cmd) => cmd.execute(&config),
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
