//! Completion clients for the hosted LLM providers.
//!
//! Groq and OpenAI are reached through the OpenAI-compatible chat completions
//! endpoint with reqwest; Gemini goes through rstructor.

use crate::config::{Config, ConfigError, Provider};
use reqwest::{Client, StatusCode};
use rstructor::{GeminiClient, LLMClient};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// User-Agent string identifying this client
const USER_AGENT: &str = concat!("recap/", env!("CARGO_PKG_VERSION"), " (https://github.com/cladam/recap)");

/// Default timeout for completion requests
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Sampling temperature for every request
pub const TEMPERATURE: f32 = 0.3;

/// Upper bound on reply length for every request
pub const MAX_TOKENS: u32 = 500;

#[derive(Error, Debug)]
pub enum CompletionError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API returned {status}: {message}")]
    Status { status: StatusCode, message: String },
    #[error("API reply contained no message")]
    EmptyReply,
    #[error("provider error: {0}")]
    Provider(String),
}

/// Something that turns a prompt into the model's reply text.
#[allow(async_fn_in_trait)]
pub trait CompletionBackend {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError>;
}

/// The backend selected by configuration
pub enum Backend {
    Chat(ChatClient),
    Gemini(GeminiBackend),
}

impl Backend {
    /// Build the configured backend; fails if the API key is missing
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let provider = config.provider()?;
        let api_key = config.api_key()?.to_string();
        let model = config.model()?;

        match config.base_url()? {
            Some(base_url) if provider != Provider::Gemini => {
                let client = ChatClient::new(&base_url, &api_key, &model)?;
                Ok(Backend::Chat(client))
            }
            _ => Ok(Backend::Gemini(GeminiBackend::new(api_key, &model))),
        }
    }

    /// Model identifier sent with every request
    pub fn model(&self) -> &str {
        match self {
            Backend::Chat(client) => &client.model,
            Backend::Gemini(backend) => &backend.model,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Backend::Chat(client) => format!("{} ({})", client.model, client.base_url),
            Backend::Gemini(backend) => format!("{} (gemini)", backend.model),
        }
    }
}

impl CompletionBackend for Backend {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        match self {
            Backend::Chat(client) => client.complete(prompt).await,
            Backend::Gemini(backend) => backend.complete(prompt).await,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ReplyMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: Option<u32>,
    #[serde(default)]
    completion_tokens: Option<u32>,
}

/// Client for OpenAI-compatible chat completion endpoints.
pub struct ChatClient {
    http: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl ChatClient {
    pub fn new(base_url: &str, api_key: &str, model: &str) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        })
    }

    fn request_body<'a>(&'a self, prompt: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        }
    }
}

impl CompletionBackend for ChatClient {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        let url = format!("{}/chat/completions", self.base_url);
        tracing::info!(model = %self.model, %url, prompt_chars = prompt.len(), "sending completion request");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(prompt))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::Status {
                status,
                message: api_error_message(&body),
            });
        }

        let reply: ChatResponse = response.json().await?;
        reply_text(reply)
    }
}

/// Pull the assistant text out of a chat completion reply
fn reply_text(reply: ChatResponse) -> Result<String, CompletionError> {
    if let Some(usage) = &reply.usage {
        tracing::debug!(
            prompt_tokens = ?usage.prompt_tokens,
            completion_tokens = ?usage.completion_tokens,
            "completion usage"
        );
    }

    let choice = reply
        .choices
        .into_iter()
        .next()
        .ok_or(CompletionError::EmptyReply)?;
    if choice.finish_reason.as_deref() == Some("length") {
        tracing::warn!(max_tokens = MAX_TOKENS, "reply was cut off at the token limit");
    }
    choice.message.content.ok_or(CompletionError::EmptyReply)
}

/// Prefer the provider's `error.message` over the raw body
fn api_error_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: ErrorDetail,
    }
    #[derive(Deserialize)]
    struct ErrorDetail {
        message: String,
    }

    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => parsed.error.message,
        Err(_) => body.trim().to_string(),
    }
}

/// Gemini access through rstructor.
pub struct GeminiBackend {
    api_key: String,
    model: String,
}

impl GeminiBackend {
    pub fn new(api_key: String, model: &str) -> Self {
        Self {
            api_key,
            model: model.to_string(),
        }
    }
}

impl CompletionBackend for GeminiBackend {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        tracing::info!(model = %self.model, prompt_chars = prompt.len(), "sending gemini request");

        let client = GeminiClient::new(self.api_key.as_str())
            .map_err(|e| CompletionError::Provider(e.to_string()))?
            .model(self.model.as_str())
            .temperature(TEMPERATURE)
            .max_tokens(MAX_TOKENS);

        let result = client
            .generate_with_metadata(prompt)
            .await
            .map_err(|e| CompletionError::Provider(e.to_string()))?;

        Ok(result.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_body_uses_fixed_sampling() {
        let client = ChatClient::new("https://api.groq.com/openai/v1/", "key", "gemma2-9b-it").unwrap();
        assert_eq!(client.base_url, "https://api.groq.com/openai/v1");

        let body = serde_json::to_value(client.request_body("hello")).unwrap();
        assert_eq!(body["model"], "gemma2-9b-it");
        assert_eq!(body["messages"], json!([{"role": "user", "content": "hello"}]));
        assert_eq!(body["max_tokens"], 500);
        assert!((body["temperature"].as_f64().unwrap() - 0.3).abs() < 1e-6);
    }

    #[test]
    fn reply_text_takes_first_choice() {
        let reply: ChatResponse = serde_json::from_value(json!({
            "choices": [
                {"message": {"role": "assistant", "content": "{\"summary\": []}"}, "finish_reason": "stop"}
            ],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5}
        }))
        .unwrap();
        assert_eq!(reply_text(reply).unwrap(), "{\"summary\": []}");
    }

    #[test]
    fn reply_without_choices_is_an_error() {
        let reply: ChatResponse = serde_json::from_value(json!({"choices": []})).unwrap();
        assert!(matches!(reply_text(reply), Err(CompletionError::EmptyReply)));

        let reply: ChatResponse =
            serde_json::from_value(json!({"choices": [{"message": {"content": null}}]})).unwrap();
        assert!(matches!(reply_text(reply), Err(CompletionError::EmptyReply)));
    }

    #[test]
    fn api_errors_surface_provider_message() {
        let body = r#"{"error": {"message": "Invalid API Key", "type": "invalid_request_error"}}"#;
        assert_eq!(api_error_message(body), "Invalid API Key");
        assert_eq!(api_error_message(" rate limited \n"), "rate limited");
    }

    #[test]
    fn groq_config_builds_chat_backend() {
        let mut config = Config::default();
        config.api.groq_key = Some("gsk_test".to_string());
        let backend = Backend::from_config(&config).unwrap();
        assert!(matches!(backend, Backend::Chat(_)));
        assert!(backend.describe().contains("api.groq.com"));
    }

    #[test]
    fn gemini_config_builds_gemini_backend() {
        let mut config = Config::default();
        config.agent.provider = "gemini".to_string();
        config.agent.model = Some("gemini-2.5-flash-lite".to_string());
        config.api.gemini_key = Some("g-key".to_string());
        let backend = Backend::from_config(&config).unwrap();
        assert!(matches!(backend, Backend::Gemini(_)));
        assert_eq!(backend.model(), "gemini-2.5-flash-lite");
    }

    #[test]
    fn gemini_without_model_uses_gemini_default() {
        let mut config = Config::default();
        config.agent.provider = "gemini".to_string();
        config.api.gemini_key = Some("g-key".to_string());
        let backend = Backend::from_config(&config).unwrap();
        assert_eq!(backend.model(), "gemini-2.0-flash");
    }

    #[test]
    fn missing_key_fails_before_any_request() {
        let config = Config::default();
        assert!(matches!(
            Backend::from_config(&config),
            Err(ConfigError::MissingApiKey { .. })
        ));
    }
}
