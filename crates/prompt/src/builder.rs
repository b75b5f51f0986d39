//! Prompt builder for rendering templates.

use crate::types::{BuiltPrompt, PromptDefinition};
use handlebars::Handlebars;
use notion_qa_core::{AppError, AppResult};
use std::collections::HashMap;

/// Build a prompt from a definition and input variables.
///
/// Renders the user template (and the system template, if any) with HTML
/// escaping disabled, so page text reaches the model verbatim.
///
/// # Example
/// ```no_run
/// use notion_qa_prompt::{build_prompt, default_prompt};
/// use std::collections::HashMap;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut vars = HashMap::new();
/// vars.insert("content".to_string(), "# Roadmap\n\nShip v2 in Q3".to_string());
/// vars.insert("question".to_string(), "When does v2 ship?".to_string());
///
/// let built = build_prompt(&default_prompt(), vars)?;
/// println!("User prompt: {}", built.user);
/// # Ok(())
/// # }
/// ```
pub fn build_prompt(
    definition: &PromptDefinition,
    variables: HashMap<String, String>,
) -> AppResult<BuiltPrompt> {
    tracing::debug!("Building prompt: {}", definition.id);

    let handlebars = registry(definition)?;

    let user = handlebars
        .render("user", &variables)
        .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))?;

    let system = if definition.system.is_some() {
        let rendered = handlebars
            .render("system", &variables)
            .map_err(|e| AppError::Prompt(format!("Failed to render system prompt: {}", e)))?;
        Some(rendered).filter(|s| !s.trim().is_empty())
    } else {
        None
    };

    Ok(BuiltPrompt::new(
        system,
        user,
        definition.id.clone(),
        variables.into_keys().collect(),
    ))
}

/// Build the question-answering prompt for an indexed page.
pub fn build_qa_prompt(
    definition: &PromptDefinition,
    content: &str,
    question: &str,
) -> AppResult<BuiltPrompt> {
    let mut variables = HashMap::new();
    variables.insert("content".to_string(), content.to_string());
    variables.insert("question".to_string(), question.trim().to_string());

    build_prompt(definition, variables)
}

fn registry(definition: &PromptDefinition) -> AppResult<Handlebars<'static>> {
    let mut handlebars = Handlebars::new();

    // Plain text, not HTML
    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .register_template_string("user", &definition.template)
        .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

    if let Some(ref system) = definition.system {
        handlebars
            .register_template_string("system", system)
            .map_err(|e| AppError::Prompt(format!("Failed to register system prompt: {}", e)))?;
    }

    Ok(handlebars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::default_prompt;
    use crate::types::PromptOutputSpec;

    fn definition(template: &str, system: Option<&str>) -> PromptDefinition {
        PromptDefinition {
            id: "test.prompt".to_string(),
            title: "Test".to_string(),
            api_version: "1.0".to_string(),
            created_by: "test".to_string(),
            system: system.map(str::to_string),
            template: template.to_string(),
            output: PromptOutputSpec::default(),
        }
    }

    #[test]
    fn test_default_prompt_layout() {
        let built = build_qa_prompt(
            &default_prompt(),
            "\n# Goals\n\n• Ship <fast> & \"safe\"",
            "  What is the main objective?  ",
        )
        .unwrap();

        let expected = "Below is the recursively indexed content of a Notion page (including \
subpages and database entries). Analyze the content and answer the question that follows.\n\n\
\n# Goals\n\n• Ship <fast> & \"safe\"\n\nQuestion: What is the main objective?\n\nAnswer:";
        assert_eq!(built.user, expected);
        assert_eq!(built.system, None);
        assert_eq!(built.metadata.source_prompt_id, "notion.qa.default");
        assert_eq!(built.metadata.resolved_variables, vec!["content", "question"]);
    }

    #[test]
    fn test_system_template_rendered() {
        let def = definition("{{content}}", Some("You answer questions about {{title}}."));
        let mut vars = HashMap::new();
        vars.insert("content".to_string(), "body".to_string());
        vars.insert("title".to_string(), "Roadmap".to_string());

        let built = build_prompt(&def, vars).unwrap();
        assert_eq!(built.system.as_deref(), Some("You answer questions about Roadmap."));
        assert_eq!(built.user, "body");
    }

    #[test]
    fn test_blank_system_dropped() {
        let def = definition("{{content}}", Some("{{missing}}"));
        let built = build_prompt(&def, HashMap::new()).unwrap();
        assert_eq!(built.system, None);
        assert_eq!(built.user, "");
    }

    #[test]
    fn test_invalid_template() {
        let def = definition("{{#if content}}unterminated", None);
        assert!(matches!(
            build_prompt(&def, HashMap::new()),
            Err(AppError::Prompt(_))
        ));
    }
}
