//! LLM provider factory.
//!
//! Resolves a provider name plus secrets into a ready client.

use crate::client::LlmClient;
use crate::providers::{GeminiClient, OpenAiClient};
use crate::types::ProviderType;
use std::sync::Arc;

/// Create an LLM client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier ("gemini", "openai")
/// * `endpoint` - Optional custom endpoint URL
/// * `api_key` - API key; both hosted providers require one
/// * `organization` - Optional OpenAI organization id
///
/// # Errors
/// Returns error if the provider is unknown or the API key is missing.
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
    organization: Option<&str>,
) -> Result<Arc<dyn LlmClient>, String> {
    let provider_type =
        ProviderType::parse(provider).ok_or_else(|| format!("Unknown provider: {}", provider))?;

    let api_key = api_key
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(|| {
            format!(
                "{} provider requires API key (set {})",
                provider_type.display_name(),
                provider_type.api_key_env()
            )
        })?;

    let base_url = endpoint.unwrap_or(provider_type.default_endpoint());

    match provider_type {
        ProviderType::Gemini => Ok(Arc::new(GeminiClient::with_base_url(base_url, api_key))),
        ProviderType::OpenAI => {
            let mut client = OpenAiClient::with_base_url(base_url, api_key);
            if let Some(organization) = organization {
                client = client.with_organization(organization);
            }
            Ok(Arc::new(client))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_gemini_client() {
        let client = create_client("gemini", None, Some("key"), None).unwrap();
        assert_eq!(client.provider_name(), "gemini");
    }

    #[test]
    fn test_create_openai_with_custom_endpoint() {
        let client =
            create_client("OpenAI", Some("http://localhost:8080/v1"), Some("sk"), Some("org"))
                .unwrap();
        assert_eq!(client.provider_name(), "openai");
    }

    #[test]
    fn test_openai_requires_api_key() {
        match create_client("openai", None, None, None) {
            Err(err) => assert!(err.contains("OpenAI provider requires API key")),
            Ok(_) => panic!("Expected error for OpenAI without API key"),
        }
    }

    #[test]
    fn test_gemini_rejects_blank_api_key() {
        match create_client("gemini", None, Some("  "), None) {
            Err(err) => assert!(err.contains("GEMINI_API_KEY")),
            Ok(_) => panic!("Expected error for blank Gemini key"),
        }
    }

    #[test]
    fn test_unknown_provider() {
        match create_client("ollama", None, Some("key"), None) {
            Err(err) => assert!(err.contains("Unknown provider")),
            Ok(_) => panic!("Expected error for unknown provider"),
        }
    }
}
