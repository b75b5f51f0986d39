//! Notion object and indexing type definitions.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::render::rich_text_field;

/// A block as returned by the block-children endpoint.
///
/// Only the fields the indexer needs are typed; the type-specific payload
/// (`paragraph`, `heading_1`, `child_page`, ...) stays as JSON and is read
/// through [`Block::body`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub id: String,

    #[serde(rename = "type", default)]
    pub kind: String,

    #[serde(default)]
    pub has_children: bool,

    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl Block {
    /// Build a block from its type and type payload.
    pub fn new(id: impl Into<String>, kind: impl Into<String>, body: Value) -> Self {
        let kind = kind.into();
        let mut payload = Map::new();
        payload.insert(kind.clone(), body);

        Self {
            id: id.into(),
            kind,
            has_children: false,
            payload,
        }
    }

    pub fn with_children(mut self) -> Self {
        self.has_children = true;
        self
    }

    /// The payload stored under the block's type key.
    pub fn body(&self) -> Option<&Value> {
        self.payload.get(&self.kind)
    }

    /// A string field of the body, e.g. the `title` of a `child_page`.
    pub fn body_str(&self, field: &str) -> Option<&str> {
        self.body().and_then(|b| b.get(field)).and_then(Value::as_str)
    }
}

/// A page (or database entry) object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    pub id: String,

    #[serde(default)]
    pub properties: Map<String, Value>,
}

impl Page {
    /// Text of the page's title property, if it has a non-empty one.
    pub fn title(&self) -> Option<String> {
        self.properties
            .values()
            .find(|prop| prop.get("type").and_then(Value::as_str) == Some("title"))
            .map(|prop| rich_text_field(prop, "title"))
            .filter(|title| !title.is_empty())
    }
}

/// One page of a paginated list response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedList<T> {
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,

    #[serde(default)]
    pub next_cursor: Option<String>,

    #[serde(default)]
    pub has_more: bool,
}

impl<T> PaginatedList<T> {
    /// A final page holding `results`.
    pub fn last(results: Vec<T>) -> Self {
        Self {
            results,
            next_cursor: None,
            has_more: false,
        }
    }
}

/// Options controlling a recursive index run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexOptions {
    /// Results requested per list/query call (Notion allows at most 100)
    pub page_size: u32,

    /// Maximum sub-page nesting to follow; `None` walks the whole tree.
    /// The root page is depth 0; child pages and database entries add one.
    pub max_depth: Option<u32>,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            page_size: 100,
            max_depth: None,
        }
    }
}

/// The flattened result of indexing one page tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexedPage {
    /// Dashed UUID of the root page
    pub page_id: String,

    /// Root page title, when page metadata was readable
    pub title: Option<String>,

    /// Sections in traversal order
    pub sections: Vec<String>,

    /// Sections joined with blank lines; this is what the model sees
    pub content: String,

    /// Sub-pages and database entries visited
    pub pages_indexed: u64,

    pub duration_secs: f64,
}

impl IndexedPage {
    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty()
    }

    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("Untitled")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_block_deserialization_keeps_payload() {
        let raw = json!({
            "object": "block",
            "id": "b1",
            "type": "to_do",
            "has_children": true,
            "to_do": {"rich_text": [{"plain_text": "Write tests"}], "checked": true}
        });

        let block: Block = serde_json::from_value(raw).unwrap();
        assert_eq!(block.kind, "to_do");
        assert!(block.has_children);
        assert_eq!(block.body().unwrap()["checked"], true);
        assert!(block.payload.contains_key("object"));
    }

    #[test]
    fn test_page_title() {
        let raw = json!({
            "id": "p1",
            "properties": {
                "Status": {"type": "select", "select": {"name": "Done"}},
                "Name": {"type": "title", "title": [{"plain_text": "Launch"}, {"plain_text": "plan"}]}
            }
        });

        let page: Page = serde_json::from_value(raw).unwrap();
        assert_eq!(page.title().as_deref(), Some("Launch plan"));
    }

    #[test]
    fn test_page_without_title() {
        let page: Page = serde_json::from_value(json!({
            "id": "p1",
            "properties": {"Name": {"type": "title", "title": []}}
        }))
        .unwrap();
        assert_eq!(page.title(), None);
    }

    #[test]
    fn test_paginated_list_defaults() {
        let list: PaginatedList<Block> =
            serde_json::from_value(json!({"object": "list", "results": []})).unwrap();
        assert!(!list.has_more);
        assert!(list.next_cursor.is_none());
    }
}
