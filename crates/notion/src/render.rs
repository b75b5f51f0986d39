//! Block text extraction and plain-text rendering.
//!
//! Rendering is intentionally lossy: the output only has to be readable by a
//! language model, so annotations, links and colors are dropped.

use serde_json::Value;

use crate::types::Block;

/// Fields that may carry a block's text, in lookup order.
const TEXT_FIELDS: [&str; 4] = ["text", "rich_text", "title", "content"];

/// Text of one rich-text style field of `container`.
///
/// Arrays join each element's `plain_text` with single spaces, objects yield
/// their own `plain_text`, strings are taken as is. Anything else is empty.
pub fn rich_text_field(container: &Value, field: &str) -> String {
    match container.get(field) {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::Object(obj) => obj
                    .get("plain_text")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(" "),
        Some(Value::Object(obj)) => obj
            .get("plain_text")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        Some(Value::String(s)) => s.clone(),
        _ => String::new(),
    }
}

/// Text content of a block: the first non-empty text field of its body.
pub fn block_text(block: &Block) -> String {
    let Some(body) = block.body() else {
        return String::new();
    };

    TEXT_FIELDS
        .iter()
        .map(|field| rich_text_field(body, field))
        .find(|text| !text.is_empty())
        .unwrap_or_default()
}

/// Render a block as a line of plain text, or `None` if it carries no text.
pub fn render_block(block: &Block) -> Option<String> {
    let text = block_text(block);
    if text.trim().is_empty() {
        return None;
    }

    let rendered = match block.kind.as_str() {
        "heading_1" => format!("\n# {}\n", text),
        "heading_2" => format!("\n## {}\n", text),
        "heading_3" => format!("\n### {}\n", text),
        "bulleted_list_item" | "numbered_list_item" => format!("• {}", text),
        "toggle" => format!("▶ {}", text),
        "to_do" => {
            let checked = block
                .body()
                .and_then(|b| b.get("checked"))
                .and_then(Value::as_bool)
                .unwrap_or(false);
            format!("{} {}", if checked { "[x]" } else { "[ ]" }, text)
        }
        "code" => {
            let language = block.body_str("language").unwrap_or_default();
            format!("\n```{}\n{}\n```\n", language, text)
        }
        "quote" => format!("> {}", text),
        "callout" => {
            let emoji = block
                .body()
                .and_then(|b| b.get("icon"))
                .and_then(|icon| icon.get("emoji"))
                .and_then(Value::as_str)
                .unwrap_or_default();
            format!("{} {}", emoji, text)
        }
        _ => text,
    };

    Some(rendered)
}

/// Block types whose rendered text is run together into one paragraph.
pub fn is_inline_group(kind: &str) -> bool {
    matches!(
        kind,
        "paragraph" | "bulleted_list_item" | "numbered_list_item"
    )
}
