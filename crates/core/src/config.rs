//! Configuration management for the Notion QA CLI.
//!
//! This module handles loading and merging configuration from multiple sources:
//! - Config files (.notion-qa/config.yaml)
//! - Environment variables
//! - Command-line flags
//!
//! Secrets are never stored in the config file itself; the file only names the
//! environment variables that hold them.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Providers the CLI knows how to talk to.
pub const KNOWN_PROVIDERS: [&str; 2] = ["gemini", "openai"];

/// Notion's maximum page size for list and query endpoints.
pub const MAX_NOTION_PAGE_SIZE: u32 = 100;

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .notion-qa/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// LLM provider ("gemini" or "openai")
    pub provider: String,

    /// Model identifier; the provider default is used when unset
    pub model: Option<String>,

    /// Explicit API key for the LLM provider
    pub api_key: Option<String>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// LLM provider configurations
    pub llm: Option<LlmConfig>,

    /// Notion API settings
    pub notion: NotionConfig,
}

/// LLM configuration from config.yaml.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(rename = "activeProvider")]
    pub active_provider: String,

    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

/// Provider-specific configuration, keyed by provider name in `LlmConfig`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(rename = "apiKeyEnv", default)]
    pub api_key_env: Option<String>,

    #[serde(default)]
    pub model: Option<String>,

    #[serde(default)]
    pub endpoint: Option<String>,

    /// OpenAI only
    #[serde(rename = "organizationEnv", default)]
    pub organization_env: Option<String>,
}

/// Notion API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotionConfig {
    /// Environment variable holding the integration token
    #[serde(rename = "tokenEnv", default = "default_token_env")]
    pub token_env: String,

    /// API base URL
    #[serde(default = "default_notion_endpoint")]
    pub endpoint: String,

    /// Value of the `Notion-Version` header
    #[serde(default = "default_notion_version")]
    pub version: String,

    /// Page size for block listing and database queries
    #[serde(rename = "pageSize", default = "default_page_size")]
    pub page_size: u32,
}

fn default_token_env() -> String {
    "NOTION_API_KEY".to_string()
}

fn default_notion_endpoint() -> String {
    "https://api.notion.com/v1".to_string()
}

fn default_notion_version() -> String {
    "2022-06-28".to_string()
}

fn default_page_size() -> u32 {
    MAX_NOTION_PAGE_SIZE
}

impl Default for NotionConfig {
    fn default() -> Self {
        Self {
            token_env: default_token_env(),
            endpoint: default_notion_endpoint(),
            version: default_notion_version(),
            page_size: default_page_size(),
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigFile {
    llm: Option<LlmConfig>,
    notion: Option<NotionConfig>,
    workspace: Option<WorkspaceConfig>,
    logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WorkspaceConfig {
    path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
}

/// Default model for a provider.
pub fn default_model(provider: &str) -> Option<&'static str> {
    match provider {
        "gemini" => Some("gemini-2.0-flash-exp"),
        "openai" => Some("gpt-4o-mini"),
        _ => None,
    }
}

/// Environment variable conventionally holding a provider's API key.
pub fn default_api_key_env(provider: &str) -> Option<&'static str> {
    match provider {
        "gemini" => Some("GEMINI_API_KEY"),
        "openai" => Some("OPENAI_API_KEY"),
        _ => None,
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            provider: "gemini".to_string(),
            model: None,
            api_key: None,
            log_level: None,
            verbose: false,
            no_color: false,
            llm: None,
            notion: NotionConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and defaults.
    ///
    /// Environment variables:
    /// - `NOTION_QA_WORKSPACE`: Override workspace path
    /// - `NOTION_QA_CONFIG`: Path to config file
    /// - `NOTION_QA_PROVIDER`: LLM provider
    /// - `NOTION_QA_MODEL`: Model identifier
    /// - `NOTION_QA_LLM_API_KEY`: API key for the LLM provider
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use notion_qa_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Provider: {}", config.provider);
    /// ```
    pub fn load() -> AppResult<Self> {
        Self::load_with(None, None)
    }

    /// Load configuration, with explicit workspace and config file paths
    /// taking precedence over the environment.
    pub fn load_with(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        if let Some(workspace) = workspace.or_else(|| env_path("NOTION_QA_WORKSPACE")) {
            config.workspace = workspace;
        }

        config.config_file = config_file.or_else(|| env_path("NOTION_QA_CONFIG"));

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = config
            .config_file
            .clone()
            .unwrap_or_else(|| config.state_dir().join("config.yaml"));

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        } else if config.config_file.is_some() {
            return Err(AppError::Config(format!(
                "Config file not found: {:?}",
                config_path
            )));
        }

        // Environment variables override YAML config
        config.apply_model_env(
            non_empty_env("NOTION_QA_PROVIDER"),
            non_empty_env("NOTION_QA_MODEL"),
        );

        if let Ok(key) = std::env::var("NOTION_QA_LLM_API_KEY") {
            config.api_key = Some(key);
        }

        if let Ok(level) = std::env::var("RUST_LOG") {
            config.log_level = Some(level);
        }

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Apply `NOTION_QA_PROVIDER` / `NOTION_QA_MODEL` values.
    ///
    /// A provider switch drops the model taken from the previous provider's
    /// block; an explicit model still wins.
    fn apply_model_env(&mut self, provider: Option<String>, model: Option<String>) {
        if let Some(provider) = provider {
            let provider = provider.trim().to_lowercase();
            if provider != self.provider {
                self.model = self.provider_config(&provider).and_then(|pc| pc.model);
            }
            self.provider = provider;
        }

        if let Some(model) = model {
            self.model = Some(model);
        }
    }

    /// Merge YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(path) = config_file.workspace.and_then(|ws| ws.path) {
            result.workspace = PathBuf::from(path);
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        if let Some(notion) = config_file.notion {
            result.notion = notion;
        }

        if let Some(mut llm) = config_file.llm {
            llm.active_provider = llm.active_provider.trim().to_lowercase();
            result.provider = llm.active_provider.clone();

            if let Some(model) = llm
                .providers
                .get(&llm.active_provider)
                .and_then(|pc| pc.model.clone())
            {
                result.model = Some(model);
            }

            result.llm = Some(llm);
        }

        tracing::debug!("Merged config file {:?}", path);

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// Command-line flags take precedence over environment variables and the
    /// config file.
    pub fn with_overrides(
        mut self,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(provider) = provider {
            let provider = provider.trim().to_lowercase();
            // A provider switch invalidates a model picked for the old provider
            // unless a model was also given explicitly.
            if provider != self.provider && model.is_none() {
                self.model = self.provider_config(&provider).and_then(|pc| pc.model);
            }
            self.provider = provider;
        }

        if let Some(model) = model {
            self.model = Some(model);
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Get the path to the .notion-qa directory.
    pub fn state_dir(&self) -> PathBuf {
        self.workspace.join(".notion-qa")
    }

    /// The configured model, or the provider's default.
    pub fn effective_model(&self) -> AppResult<String> {
        if let Some(ref model) = self.model {
            return Ok(model.clone());
        }

        default_model(&self.provider)
            .map(str::to_string)
            .ok_or_else(|| {
                AppError::Config(format!("No model configured for provider {}", self.provider))
            })
    }

    /// Get a provider's configuration block, if the config file has one.
    pub fn provider_config(&self, provider: &str) -> Option<ProviderConfig> {
        self.llm
            .as_ref()
            .and_then(|llm| llm.providers.get(provider).cloned())
    }

    /// Custom endpoint for a provider, if configured.
    pub fn provider_endpoint(&self, provider: &str) -> Option<String> {
        self.provider_config(provider).and_then(|pc| pc.endpoint)
    }

    /// Resolve the LLM API key.
    ///
    /// Order: explicit key, the provider's `apiKeyEnv`, then the provider's
    /// conventional variable (`GEMINI_API_KEY` / `OPENAI_API_KEY`).
    pub fn resolve_api_key(&self, provider: &str) -> Option<String> {
        if let Some(ref key) = self.api_key {
            return Some(key.clone());
        }

        let configured = self.provider_config(provider).and_then(|pc| pc.api_key_env);
        let env_var = configured.or_else(|| default_api_key_env(provider).map(str::to_string))?;

        non_empty_env(&env_var)
    }

    /// Resolve the OpenAI organization id from `organizationEnv`, if set.
    pub fn resolve_organization(&self, provider: &str) -> Option<String> {
        self.provider_config(provider)
            .and_then(|pc| pc.organization_env)
            .and_then(|env_var| non_empty_env(&env_var))
    }

    /// Resolve the Notion integration token.
    pub fn resolve_notion_token(&self) -> AppResult<String> {
        non_empty_env(&self.notion.token_env).ok_or_else(|| {
            AppError::Config(format!(
                "Notion integration token not found in environment variable: {}",
                self.notion.token_env
            ))
        })
    }

    /// Validate configuration for the active provider.
    pub fn validate(&self) -> AppResult<()> {
        let provider = self.provider.as_str();

        if !KNOWN_PROVIDERS.contains(&provider) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                provider,
                KNOWN_PROVIDERS.join(", ")
            )));
        }

        if self.notion.page_size == 0 || self.notion.page_size > MAX_NOTION_PAGE_SIZE {
            return Err(AppError::Config(format!(
                "Notion page size must be between 1 and {}, got {}",
                MAX_NOTION_PAGE_SIZE, self.notion.page_size
            )));
        }

        Ok(())
    }
}

fn env_path(name: &str) -> Option<PathBuf> {
    non_empty_env(name).map(PathBuf::from)
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_config(dir: &Path, contents: &str) -> PathBuf {
        let state_dir = dir.join(".notion-qa");
        fs::create_dir_all(&state_dir).unwrap();
        let path = state_dir.join("config.yaml");
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.provider, "gemini");
        assert_eq!(config.model, None);
        assert_eq!(config.effective_model().unwrap(), "gemini-2.0-flash-exp");
        assert_eq!(config.notion.page_size, 100);
        assert_eq!(config.notion.token_env, "NOTION_API_KEY");
        assert!(!config.verbose);
    }

    #[test]
    fn test_state_dir() {
        let config = AppConfig::default();
        assert!(config.state_dir().ends_with(".notion-qa"));
    }

    #[test]
    fn test_with_overrides() {
        let config = AppConfig::default();
        let overridden = config.with_overrides(
            Some("openai".to_string()),
            Some("gpt-4o".to_string()),
            None,
            true,
            false,
        );

        assert_eq!(overridden.provider, "openai");
        assert_eq!(overridden.effective_model().unwrap(), "gpt-4o");
        assert!(overridden.verbose);
        assert_eq!(overridden.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_provider_switch_resets_model() {
        let mut config = AppConfig::default();
        config.model = Some("gemini-1.5-pro".to_string());

        let switched = config.with_overrides(Some("openai".to_string()), None, None, false, false);
        assert_eq!(switched.effective_model().unwrap(), "gpt-4o-mini");
    }

    #[test]
    fn test_env_provider_switch_drops_yaml_model() {
        let temp_dir = TempDir::new().unwrap();
        write_config(
            temp_dir.path(),
            r#"
llm:
  activeProvider: gemini
  providers:
    gemini:
      model: gemini-1.5-pro
"#,
        );

        let mut config = AppConfig::load_with(Some(temp_dir.path().to_path_buf()), None).unwrap();
        assert_eq!(config.model.as_deref(), Some("gemini-1.5-pro"));

        config.apply_model_env(Some("openai".to_string()), None);
        // main.rs passes the same provider again as a CLI override
        let config = config.with_overrides(Some("openai".to_string()), None, None, false, false);

        assert_eq!(config.provider, "openai");
        assert_eq!(config.effective_model().unwrap(), "gpt-4o-mini");
    }

    #[test]
    fn test_env_provider_switch_uses_target_block_and_env_model() {
        let temp_dir = TempDir::new().unwrap();
        write_config(
            temp_dir.path(),
            r#"
llm:
  activeProvider: gemini
  providers:
    gemini:
      model: gemini-1.5-pro
    openai:
      model: gpt-4o
"#,
        );

        let mut config = AppConfig::load_with(Some(temp_dir.path().to_path_buf()), None).unwrap();
        config.apply_model_env(Some("openai".to_string()), None);
        assert_eq!(config.model.as_deref(), Some("gpt-4o"));

        config.apply_model_env(Some("gemini".to_string()), Some("gemini-exp".to_string()));
        assert_eq!(config.provider, "gemini");
        assert_eq!(config.model.as_deref(), Some("gemini-exp"));
    }

    #[test]
    fn test_provider_names_are_case_insensitive() {
        let config = AppConfig::default().with_overrides(
            Some("OpenAI".to_string()),
            None,
            None,
            false,
            false,
        );
        assert_eq!(config.provider, "openai");
        assert!(config.validate().is_ok());

        let mut config = AppConfig::default();
        config.apply_model_env(Some(" Gemini ".to_string()), None);
        assert_eq!(config.provider, "gemini");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_merge_yaml() {
        let temp_dir = TempDir::new().unwrap();
        write_config(
            temp_dir.path(),
            r#"
llm:
  activeProvider: openai
  providers:
    openai:
      apiKeyEnv: NOTION_QA_TEST_OPENAI_KEY
      model: gpt-4o
      endpoint: http://localhost:8080/v1
    gemini:
      model: gemini-1.5-flash
notion:
  tokenEnv: NOTION_QA_TEST_TOKEN
  pageSize: 50
logging:
  level: warn
  color: false
"#,
        );

        let config = AppConfig::load_with(Some(temp_dir.path().to_path_buf()), None).unwrap();
        assert_eq!(config.provider, "openai");
        assert_eq!(config.model.as_deref(), Some("gpt-4o"));
        assert_eq!(
            config.provider_endpoint("openai").as_deref(),
            Some("http://localhost:8080/v1")
        );
        assert_eq!(config.notion.token_env, "NOTION_QA_TEST_TOKEN");
        assert_eq!(config.notion.page_size, 50);
        assert_eq!(config.notion.version, "2022-06-28");
        assert!(config.no_color);
    }

    #[test]
    fn test_missing_explicit_config_file() {
        let temp_dir = TempDir::new().unwrap();
        let result = AppConfig::load_with(
            Some(temp_dir.path().to_path_buf()),
            Some(temp_dir.path().join("nope.yaml")),
        );
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_invalid_yaml() {
        let temp_dir = TempDir::new().unwrap();
        write_config(temp_dir.path(), "llm: [unterminated");

        let result = AppConfig::load_with(Some(temp_dir.path().to_path_buf()), None);
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_resolve_api_key_from_configured_env() {
        std::env::set_var("NOTION_QA_TEST_GEMINI_KEY_A", "secret-a");

        let mut providers = HashMap::new();
        providers.insert(
            "gemini".to_string(),
            ProviderConfig {
                api_key_env: Some("NOTION_QA_TEST_GEMINI_KEY_A".to_string()),
                ..Default::default()
            },
        );
        let config = AppConfig {
            llm: Some(LlmConfig {
                active_provider: "gemini".to_string(),
                providers,
            }),
            ..Default::default()
        };

        assert_eq!(config.resolve_api_key("gemini").as_deref(), Some("secret-a"));
    }

    #[test]
    fn test_explicit_api_key_wins() {
        let config = AppConfig {
            api_key: Some("explicit".to_string()),
            ..Default::default()
        };
        assert_eq!(config.resolve_api_key("openai").as_deref(), Some("explicit"));
    }

    #[test]
    fn test_missing_notion_token() {
        let config = AppConfig {
            notion: NotionConfig {
                token_env: "NOTION_QA_TEST_UNSET_TOKEN".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(
            config.resolve_notion_token(),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn test_validate_unknown_provider() {
        let config = AppConfig {
            provider: "ollama".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_page_size() {
        let mut config = AppConfig::default();
        assert!(config.validate().is_ok());

        config.notion.page_size = 101;
        assert!(config.validate().is_err());

        config.notion.page_size = 0;
        assert!(config.validate().is_err());
    }
}
