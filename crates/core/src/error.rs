//! Error types for the Notion QA CLI.
//!
//! This module defines a unified error enum that covers all error categories
//! in the application, including configuration, I/O, LLM, Notion and prompt
//! errors.

use thiserror::Error;

/// Unified error type for the Notion QA CLI.
///
/// All functions in the application return `Result<T, AppError>`.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// LLM provider errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Notion transport and decoding errors
    #[error("Notion error: {0}")]
    Notion(String),

    /// Error body returned by the Notion API
    #[error("Notion API error ({status} {code}): {message}")]
    NotionApi {
        status: u16,
        code: String,
        message: String,
    },

    /// Prompt system errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl AppError {
    /// Whether this error came back from the Notion API itself
    /// (as opposed to a network or decoding failure).
    pub fn is_notion_api(&self) -> bool {
        matches!(self, AppError::NotionApi { .. })
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
