//! LLM agent module for meeting analysis.
//!
//! One completion call per analysis: validate the transcript, build the
//! prompt, send it, parse the reply. Failures are not retried.

pub use crate::analysis::AnalysisRecord;

use crate::client::{Backend, CompletionBackend};
use crate::config::{Config, ConfigError};
use crate::parse::parse_reply;
use crate::prompt;
use crate::transcript::Transcript;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("please enter a meeting transcript to analyze")]
    EmptyTranscript,
    #[error("Failed to parse JSON response: {reason}")]
    Parse { raw: String, reason: String },
    #[error("Failed to analyze meeting: {0}")]
    Request(String),
}

impl AnalysisError {
    /// The model's reply, when the failure happened while parsing it
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            AnalysisError::Parse { raw, .. } => Some(raw),
            _ => None,
        }
    }
}

/// Serializable form of an analysis failure, emitted in place of a record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parse_error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl From<&AnalysisError> for ErrorRecord {
    fn from(err: &AnalysisError) -> Self {
        match err {
            AnalysisError::EmptyTranscript => ErrorRecord {
                error: "Empty transcript".to_string(),
                raw_response: None,
                parse_error: None,
                error_message: Some(err.to_string()),
            },
            AnalysisError::Parse { raw, reason } => ErrorRecord {
                error: "Failed to parse JSON response".to_string(),
                raw_response: Some(raw.clone()),
                parse_error: Some(reason.clone()),
                error_message: None,
            },
            AnalysisError::Request(message) => ErrorRecord {
                error: "Failed to analyze meeting".to_string(),
                raw_response: None,
                parse_error: None,
                error_message: Some(message.clone()),
            },
        }
    }
}

/// Runs analyses against one completion backend.
pub struct Analyzer<B = Backend> {
    backend: B,
}

impl Analyzer<Backend> {
    /// Build an analyzer from configuration.
    ///
    /// A missing API key fails here, before any transcript is read.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let backend = Backend::from_config(config)?;
        tracing::debug!(backend = %backend.describe(), "analyzer ready");
        Ok(Self::new(backend))
    }
}

impl<B: CompletionBackend> Analyzer<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Run the analysis on the provided transcript text
    pub async fn analyze(&self, text: &str) -> Result<AnalysisRecord, AnalysisError> {
        let transcript = Transcript::new(text)?;
        let prompt = prompt::analysis_prompt(&transcript);

        let reply = self
            .backend
            .complete(&prompt)
            .await
            .map_err(|e| AnalysisError::Request(e.to_string()))?;
        tracing::debug!(reply_chars = reply.len(), "received analysis reply");

        parse_reply(&reply)
    }

    /// Get a brief prose summary of the meeting
    pub async fn summarize(&self, text: &str) -> Result<String, AnalysisError> {
        let transcript = Transcript::new(text)?;
        let prompt = prompt::summary_prompt(&transcript);

        let reply = self
            .backend
            .complete(&prompt)
            .await
            .map_err(|e| AnalysisError::Request(e.to_string()))?;

        Ok(reply.trim().to_string())
    }
}
