//! Runs one turn of a conversation with an OpenAI assistant, executing the
//! local tool functions the assistant asks for along the way.
//!
//! The entry point is [`session::AssistantSession::chat`], which drives a run
//! from creation through any number of tool-call rounds to completion.

use serde::Deserialize;
use std::env;

pub mod assistants;
pub mod client;
pub mod config;
pub mod descriptor;
pub mod dispatch;
pub mod error;
pub mod remember;
pub mod session;
pub mod tools;

pub use client::OpenAiClient;
pub use config::{PollConfig, SessionConfig};
pub use error::AssistantError;
pub use session::{AssistantSession, ChatResponse};
pub use tools::FunctionMap;

pub const BASE_URL: &str = "https://api.openai.com/v1/";

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct OpenAiError {
    pub message: String,
    #[serde(rename = "type")]
    pub error_type: String,
    pub param: Option<String>,
    pub code: Option<String>,
}

impl OpenAiError {
    pub fn new(message: String, error_type: String) -> OpenAiError {
        OpenAiError {
            message,
            error_type,
            param: None,
            code: None,
        }
    }
}

impl std::fmt::Display for OpenAiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for OpenAiError {}

impl From<reqwest::Error> for OpenAiError {
    fn from(value: reqwest::Error) -> Self {
        OpenAiError::new(value.to_string(), "reqwest".to_string())
    }
}

impl From<serde_json::Error> for OpenAiError {
    fn from(value: serde_json::Error) -> Self {
        OpenAiError::new(value.to_string(), "serde_json".to_string())
    }
}

impl From<reqwest::header::InvalidHeaderValue> for OpenAiError {
    fn from(value: reqwest::header::InvalidHeaderValue) -> Self {
        OpenAiError::new(value.to_string(), "invalid_header".to_string())
    }
}

pub type ApiResponseOrError<T> = Result<T, OpenAiError>;

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Credentials {
    api_key: String,
    base_url: String,
}

impl Credentials {
    /// Creates credentials with the given API key and base URL.
    ///
    /// A trailing slash is appended to the base URL when missing, so routes
    /// can be joined onto it directly.
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if base_url.is_empty() {
            base_url = BASE_URL.to_string();
        }
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self {
            api_key: api_key.into(),
            base_url,
        }
    }

    /// Fetches the credentials from the ENV variables
    /// OPENAI_API_KEY and OPENAI_BASE_URL.
    ///
    /// A missing key yields an empty one; the service then answers every
    /// request with an authentication error. A missing base URL falls back
    /// to [`BASE_URL`].
    pub fn from_env() -> Credentials {
        let api_key = env::var("OPENAI_API_KEY").unwrap_or_default();
        let base_url = env::var("OPENAI_BASE_URL").unwrap_or_else(|_| BASE_URL.to_string());
        Credentials::new(api_key, base_url)
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}
