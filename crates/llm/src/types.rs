//! Provider identification.

use crate::providers::gemini::DEFAULT_GEMINI_ENDPOINT;
use crate::providers::openai::DEFAULT_OPENAI_ENDPOINT;

/// Provider type enum for matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderType {
    Gemini,
    OpenAI,
}

impl ProviderType {
    /// Parse provider type from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "gemini" => Some(Self::Gemini),
            "openai" => Some(Self::OpenAI),
            _ => None,
        }
    }

    /// Get the canonical provider name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::OpenAI => "openai",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Gemini => "Gemini",
            Self::OpenAI => "OpenAI",
        }
    }

    pub fn default_endpoint(&self) -> &'static str {
        match self {
            Self::Gemini => DEFAULT_GEMINI_ENDPOINT,
            Self::OpenAI => DEFAULT_OPENAI_ENDPOINT,
        }
    }

    /// Model used when none is configured.
    pub fn default_model(&self) -> &'static str {
        notion_qa_core::config::default_model(self.as_str()).unwrap_or("gpt-4o-mini")
    }

    /// Conventional environment variable holding the API key.
    pub fn api_key_env(&self) -> &'static str {
        notion_qa_core::config::default_api_key_env(self.as_str()).unwrap_or("NOTION_QA_LLM_API_KEY")
    }
}
