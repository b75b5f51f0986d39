//! Notion API client.
//!
//! Notion API reference: https://developers.notion.com/reference/intro

use notion_qa_core::config::NotionConfig;
use notion_qa_core::{AppError, AppResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::types::{Block, PaginatedList, Page};

pub const DEFAULT_NOTION_ENDPOINT: &str = "https://api.notion.com/v1";
pub const DEFAULT_NOTION_VERSION: &str = "2022-06-28";

/// The three read endpoints the indexer needs.
///
/// The indexer only talks to this trait, so tests can drive it with an
/// in-memory workspace.
#[async_trait::async_trait]
pub trait NotionApi: Send + Sync {
    /// Retrieve page metadata (properties, including the title).
    async fn retrieve_page(&self, page_id: &str) -> AppResult<Page>;

    /// List one page of a block's children.
    async fn list_block_children(
        &self,
        block_id: &str,
        start_cursor: Option<&str>,
        page_size: u32,
    ) -> AppResult<PaginatedList<Block>>;

    /// Query one page of a database's entries.
    async fn query_database(
        &self,
        database_id: &str,
        start_cursor: Option<&str>,
        page_size: u32,
    ) -> AppResult<PaginatedList<Page>>;
}

/// Error body returned by the Notion API.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Serialize)]
struct QueryBody<'a> {
    page_size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    start_cursor: Option<&'a str>,
}

/// HTTP implementation of [`NotionApi`].
pub struct NotionClient {
    base_url: String,
    token: String,
    version: String,
    client: reqwest::Client,
}

impl NotionClient {
    /// Create a client for the public API with an integration token.
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_base_url(DEFAULT_NOTION_ENDPOINT, token, DEFAULT_NOTION_VERSION)
    }

    pub fn with_base_url(
        base_url: impl Into<String>,
        token: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            version: version.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Create a client from the `notion` section of the app config.
    pub fn from_config(config: &NotionConfig, token: impl Into<String>) -> Self {
        Self::with_base_url(&config.endpoint, token, &config.version)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Send an authenticated request and decode the JSON body.
    async fn send<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> AppResult<T> {
        let response = request
            .bearer_auth(&self.token)
            .header("Notion-Version", &self.version)
            .send()
            .await
            .map_err(|e| AppError::Notion(format!("Failed to reach Notion: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(api_error(status.as_u16(), &text));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Notion(format!("Failed to parse Notion response: {}", e)))
    }
}

/// Build an `AppError::NotionApi` from a status and raw error body.
fn api_error(status: u16, body: &str) -> AppError {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) if !parsed.code.is_empty() => AppError::NotionApi {
            status,
            code: parsed.code,
            message: parsed.message,
        },
        _ => AppError::NotionApi {
            status,
            code: "unknown".to_string(),
            message: body.trim().to_string(),
        },
    }
}

#[async_trait::async_trait]
impl NotionApi for NotionClient {
    async fn retrieve_page(&self, page_id: &str) -> AppResult<Page> {
        tracing::debug!(page_id, "Retrieving page");
        let request = self.client.get(self.url(&format!("pages/{}", page_id)));
        self.send(request).await
    }

    async fn list_block_children(
        &self,
        block_id: &str,
        start_cursor: Option<&str>,
        page_size: u32,
    ) -> AppResult<PaginatedList<Block>> {
        tracing::debug!(block_id, ?start_cursor, "Listing block children");

        let mut query = vec![("page_size", page_size.to_string())];
        if let Some(cursor) = start_cursor {
            query.push(("start_cursor", cursor.to_string()));
        }

        let request = self
            .client
            .get(self.url(&format!("blocks/{}/children", block_id)))
            .query(&query);
        self.send(request).await
    }

    async fn query_database(
        &self,
        database_id: &str,
        start_cursor: Option<&str>,
        page_size: u32,
    ) -> AppResult<PaginatedList<Page>> {
        tracing::debug!(database_id, ?start_cursor, "Querying database");

        let request = self
            .client
            .post(self.url(&format!("databases/{}/query", database_id)))
            .json(&QueryBody {
                page_size,
                start_cursor,
            });
        self.send(request).await
    }
}
