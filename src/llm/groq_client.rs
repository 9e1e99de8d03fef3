//! Groq chat-completions client.
//!
//! Groq exposes an OpenAI-compatible API: `POST {base_url}/chat/completions`
//! with a bearer token. The client is built once at startup and shared behind
//! [`CompletionBackend`].

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::config::LlmConfig;

/// Connect timeout for the remote API.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// Overall request timeout, generation included.
const CLIENT_TIMEOUT: Duration = Duration::from_secs(60);

/// Errors produced while talking to the completion API.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// No API key was configured at startup.
    #[error("API key is not configured (set {0})")]
    MissingApiKey(&'static str),
    /// Transport-level failure (DNS, connect, timeout, TLS).
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The API answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, as returned by the API.
        body: String,
    },
    /// The response body could not be decoded or carried no assistant message.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// Role of a chat message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// Instruction message.
    System,
    /// End-user message.
    User,
    /// Model reply.
    Assistant,
}

/// A single chat message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Author role.
    pub role: ChatRole,
    /// Message text.
    pub content: String,
}

impl ChatMessage {
    /// Build a system message.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    /// Build a user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// Provider-agnostic completion request.
#[derive(Clone, Debug, PartialEq)]
pub struct ChatRequest {
    /// Conversation to complete.
    pub messages: Vec<ChatMessage>,
    /// Sampling temperature.
    pub temperature: f64,
    /// Response token budget.
    pub max_tokens: u32,
}

/// Something that can turn a [`ChatRequest`] into assistant text.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Run a single completion and return the assistant message content.
    ///
    /// # Errors
    /// Returns an error if the remote call fails or the answer is unusable.
    async fn complete(&self, request: &ChatRequest) -> Result<String, LlmError>;
}

#[derive(Serialize)]
struct CompletionBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f64,
    max_tokens: u32,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u64,
    completion_tokens: u64,
}

/// HTTP client for Groq's chat-completions endpoint.
pub struct GroqClient {
    client: Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl GroqClient {
    /// Create a client from the completion settings.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(CLIENT_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
        })
    }

    /// Model name sent with every request.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl CompletionBackend for GroqClient {
    async fn complete(&self, request: &ChatRequest) -> Result<String, LlmError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(LlmError::MissingApiKey(crate::config::API_KEY_ENV))?;

        let body = CompletionBody {
            model: &self.model,
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            stream: false,
        };

        let start = Instant::now();
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!("Completion request to {} failed: {e}", self.endpoint);
                LlmError::from(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => format!("<unreadable error body: {e}>"),
            };
            error!("Completion API returned {status}: {body}");
            return Err(LlmError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let raw = response.text().await?;
        let parsed = decode_response(&raw)?;
        if let Some(usage) = &parsed.usage {
            debug!(
                "Completion finished in {:.2}s: prompt_tokens={}, completion_tokens={}",
                start.elapsed().as_secs_f64(),
                usage.prompt_tokens,
                usage.completion_tokens
            );
        }

        extract_content(parsed)
    }
}

fn decode_response(raw: &str) -> Result<CompletionResponse, LlmError> {
    serde_json::from_str(raw).map_err(|e| {
        error!("Failed to decode completion response: {e}");
        LlmError::MalformedResponse(format!("invalid JSON: {e}"))
    })
}

fn extract_content(response: CompletionResponse) -> Result<String, LlmError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .ok_or_else(|| {
            LlmError::MalformedResponse("no message content in first choice".to_string())
        })
}
