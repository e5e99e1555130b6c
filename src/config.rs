//! Configuration loading and management for recap.
//!
//! Loads settings from `recap.toml` with environment variable overrides for sensitive data.
//! When no config file exists the built-in defaults are used, so a bare
//! `GROQ_API_KEY` in the environment (or a `.env` file) is enough to run.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the config file looked up in the working directory and config dir
pub const CONFIG_FILE_NAME: &str = "recap.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("missing required API key for provider {provider}: set {env_var}")]
    MissingApiKey {
        provider: String,
        env_var: &'static str,
    },
    #[error("failed to build HTTP client: {0}")]
    ClientError(#[from] reqwest::Error),
    #[error("unknown LLM provider: {0} (expected groq, openai or gemini)")]
    UnknownProvider(String),
}

/// Supported completion providers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Groq,
    OpenAi,
    Gemini,
}

impl Provider {
    /// Parse a provider name as written in the config file
    pub fn parse(name: &str) -> Result<Self, ConfigError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "groq" => Ok(Provider::Groq),
            "openai" => Ok(Provider::OpenAi),
            "gemini" => Ok(Provider::Gemini),
            other => Err(ConfigError::UnknownProvider(other.to_string())),
        }
    }

    /// Environment variable holding this provider's API key
    pub fn env_var(self) -> &'static str {
        match self {
            Provider::Groq => "GROQ_API_KEY",
            Provider::OpenAi => "OPENAI_API_KEY",
            Provider::Gemini => "GEMINI_API_KEY",
        }
    }

    /// Base URL of the OpenAI-compatible endpoint, if the provider has one
    pub fn default_base_url(self) -> Option<&'static str> {
        match self {
            Provider::Groq => Some("https://api.groq.com/openai/v1"),
            Provider::OpenAi => Some("https://api.openai.com/v1"),
            Provider::Gemini => None,
        }
    }

    /// Model used when the config names none
    pub fn default_model(self) -> &'static str {
        match self {
            Provider::Groq => "gemma2-9b-it",
            Provider::OpenAi => "gpt-4o-mini",
            Provider::Gemini => "gemini-2.0-flash",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Provider::Groq => "groq",
            Provider::OpenAi => "openai",
            Provider::Gemini => "gemini",
        }
    }
}

/// LLM provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// LLM provider: "groq", "openai" or "gemini"
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Model identifier (e.g., "gemma2-9b-it"); defaults per provider
    #[serde(default)]
    pub model: Option<String>,
    /// Override for the OpenAI-compatible endpoint base URL
    #[serde(default)]
    pub base_url: Option<String>,
    /// Context window of the model, used to warn about oversized transcripts
    #[serde(default = "default_context_window")]
    pub context_window_tokens: usize,
}

/// API keys configuration (loaded from environment)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApiConfig {
    #[serde(default)]
    pub groq_key: Option<String>,
    #[serde(default)]
    pub openai_key: Option<String>,
    #[serde(default)]
    pub gemini_key: Option<String>,
}

/// Storage paths configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Base path for data storage
    pub path: PathBuf,
}

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

fn default_provider() -> String {
    "groq".to_string()
}

fn default_context_window() -> usize {
    8192
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: None,
            base_url: None,
            context_window_tokens: default_context_window(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let path = dirs::data_local_dir()
            .map(|dir| dir.join("recap"))
            .unwrap_or_else(|| PathBuf::from("./data"));
        Self { path }
    }
}

impl Config {
    /// Load configuration from the default location (recap.toml in cwd or home)
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match Self::find_config_file() {
            Some(path) => {
                tracing::debug!(path = %path.display(), "loading config file");
                Self::parse_file(&path)?
            }
            None => {
                tracing::debug!("no config file found, using defaults");
                Config::default()
            }
        };
        config.apply_env();
        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::parse_file(path)?;
        config.apply_env();
        Ok(config)
    }

    fn parse_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Override API keys from environment variables
    fn apply_env(&mut self) {
        if let Some(key) = non_empty_env("GROQ_API_KEY") {
            self.api.groq_key = Some(key);
        }
        if let Some(key) = non_empty_env("OPENAI_API_KEY") {
            self.api.openai_key = Some(key);
        }
        if let Some(key) = non_empty_env("GEMINI_API_KEY") {
            self.api.gemini_key = Some(key);
        }
    }

    /// Find the config file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        // Check current directory first
        let local_config = PathBuf::from(CONFIG_FILE_NAME);
        if local_config.exists() {
            return Some(local_config);
        }

        // Check home directory
        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config").join("recap").join(CONFIG_FILE_NAME);
            if home_config.exists() {
                return Some(home_config);
            }
        }

        None
    }

    /// The configured provider
    pub fn provider(&self) -> Result<Provider, ConfigError> {
        Provider::parse(&self.agent.provider)
    }

    /// Get the API key for the configured provider
    pub fn api_key(&self) -> Result<&str, ConfigError> {
        let provider = self.provider()?;
        let key = match provider {
            Provider::Groq => self.api.groq_key.as_deref(),
            Provider::OpenAi => self.api.openai_key.as_deref(),
            Provider::Gemini => self.api.gemini_key.as_deref(),
        };
        key.filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingApiKey {
                provider: provider.name().to_string(),
                env_var: provider.env_var(),
            })
    }

    /// Model identifier, falling back to the provider's default
    pub fn model(&self) -> Result<String, ConfigError> {
        let provider = self.provider()?;
        Ok(self
            .agent
            .model
            .clone()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| provider.default_model().to_string()))
    }

    /// Endpoint base URL for OpenAI-compatible providers
    pub fn base_url(&self) -> Result<Option<String>, ConfigError> {
        let provider = self.provider()?;
        Ok(self
            .agent
            .base_url
            .clone()
            .or_else(|| provider.default_base_url().map(str::to_string)))
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
