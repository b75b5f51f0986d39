//! Page id extraction from Notion URLs.

use notion_qa_core::{AppError, AppResult};
use regex::Regex;
use std::sync::OnceLock;

/// Patterns tried in order; each captures the id in group 1.
fn id_patterns() -> &'static [Regex; 3] {
    static PATTERNS: OnceLock<[Regex; 3]> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            // notion.so/<workspace>/<slug>-<id>
            Regex::new(r"(?i)notion\.so/[^/]+/[^-]+-([a-f0-9]{32})").expect("static regex"),
            // Bare 32-hex id anywhere in the input
            Regex::new(r"(?i)([a-f0-9]{32})").expect("static regex"),
            // Already-dashed UUID
            Regex::new(r"(?i)([a-f0-9]{8}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{12})")
                .expect("static regex"),
        ]
    })
}

/// Extract the page id from a Notion URL (or a bare id) and format it as a
/// dashed UUID.
///
/// # Example
/// ```
/// use notion_qa_notion::extract_page_id;
///
/// let id = extract_page_id("https://www.notion.so/acme/Roadmap-0123456789abcdef0123456789abcdef").unwrap();
/// assert_eq!(id, "01234567-89ab-cdef-0123-456789abcdef");
/// ```
pub fn extract_page_id(url: &str) -> AppResult<String> {
    for pattern in id_patterns() {
        if let Some(found) = pattern.captures(url).and_then(|c| c.get(1)) {
            let hex: String = found
                .as_str()
                .chars()
                .filter(|c| *c != '-')
                .collect::<String>()
                .to_lowercase();
            return Ok(format_uuid(&hex));
        }
    }

    Err(AppError::Notion(format!(
        "Could not extract page ID from URL: {}",
        url
    )))
}

/// Format 32 hex digits as 8-4-4-4-12.
fn format_uuid(hex: &str) -> String {
    format!(
        "{}-{}-{}-{}-{}",
        &hex[..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..]
    )
}
