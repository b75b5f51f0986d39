//! Prompt loader for the built-in prompt and YAML prompt definitions.

use crate::types::{PromptDefinition, PromptOutputSpec};
use notion_qa_core::{AppError, AppResult};
use std::path::{Path, PathBuf};

/// Identifier of the built-in question-answering prompt.
pub const DEFAULT_PROMPT_ID: &str = "notion.qa.default";

const DEFAULT_TEMPLATE: &str = "Below is the recursively indexed content of a Notion page \
(including subpages and database entries). Analyze the content and answer the question \
that follows.\n\n{{content}}\n\nQuestion: {{question}}\n\nAnswer:";

/// The built-in prompt used when the workspace does not override it.
pub fn default_prompt() -> PromptDefinition {
    PromptDefinition {
        id: DEFAULT_PROMPT_ID.to_string(),
        title: "Notion page question answering".to_string(),
        api_version: "1.0".to_string(),
        created_by: "notion-qa".to_string(),
        system: None,
        template: DEFAULT_TEMPLATE.to_string(),
        output: PromptOutputSpec::default(),
    }
}

fn prompts_dir(workspace_path: &Path) -> PathBuf {
    workspace_path.join(".notion-qa/prompts")
}

/// Load a prompt definition by ID from the workspace.
///
/// Looks for `<id>.yml` in `.notion-qa/prompts/`. The default prompt id
/// falls back to the built-in definition when no file overrides it.
///
/// # Example
/// ```no_run
/// use notion_qa_prompt::{load_prompt, DEFAULT_PROMPT_ID};
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let prompt = load_prompt(Path::new("."), DEFAULT_PROMPT_ID)?;
/// println!("Loaded prompt: {}", prompt.title);
/// # Ok(())
/// # }
/// ```
pub fn load_prompt(workspace_path: &Path, prompt_id: &str) -> AppResult<PromptDefinition> {
    let prompt_file = prompts_dir(workspace_path).join(format!("{}.yml", prompt_id));

    tracing::debug!("Loading prompt from: {:?}", prompt_file);

    if !prompt_file.exists() {
        if prompt_id == DEFAULT_PROMPT_ID {
            tracing::debug!("Using built-in prompt {}", DEFAULT_PROMPT_ID);
            return Ok(default_prompt());
        }

        return Err(AppError::Prompt(format!(
            "Prompt file not found: {:?}",
            prompt_file
        )));
    }

    let contents = std::fs::read_to_string(&prompt_file).map_err(|e| {
        AppError::Prompt(format!(
            "Failed to read prompt file {:?}: {}",
            prompt_file, e
        ))
    })?;

    let definition: PromptDefinition = serde_yaml::from_str(&contents).map_err(|e| {
        AppError::Prompt(format!(
            "Failed to parse prompt YAML {:?}: {}",
            prompt_file, e
        ))
    })?;

    validate_prompt(&definition)?;

    tracing::info!("Loaded prompt: {} ({})", definition.id, definition.title);

    Ok(definition)
}

/// List all available prompt IDs: the built-in one plus every workspace file.
pub fn list_prompts(workspace_path: &Path) -> AppResult<Vec<String>> {
    let mut prompt_ids = vec![DEFAULT_PROMPT_ID.to_string()];
    let dir = prompts_dir(workspace_path);

    if !dir.exists() {
        return Ok(prompt_ids);
    }

    for entry in walkdir::WalkDir::new(&dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("yml") {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if !prompt_ids.iter().any(|id| id == stem) {
                    prompt_ids.push(stem.to_string());
                }
            }
        }
    }

    prompt_ids[1..].sort();

    Ok(prompt_ids)
}

/// Validate a prompt definition.
fn validate_prompt(def: &PromptDefinition) -> AppResult<()> {
    if def.id.is_empty() {
        return Err(AppError::Prompt("Prompt ID cannot be empty".to_string()));
    }

    if def.title.is_empty() {
        return Err(AppError::Prompt("Prompt title cannot be empty".to_string()));
    }

    if def.template.is_empty() {
        return Err(AppError::Prompt(
            "Prompt template cannot be empty".to_string(),
        ));
    }

    if !def.api_version.contains('.') {
        return Err(AppError::Prompt(format!(
            "Invalid apiVersion format: {}. Expected format: 'x.y'",
            def.api_version
        )));
    }

    // A template that never mentions the page would answer blind.
    if !def.template.contains("content") {
        return Err(AppError::Prompt(format!(
            "Prompt {} does not reference {{{{content}}}}",
            def.id
        )));
    }

    Ok(())
}
