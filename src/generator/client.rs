use std::future::Future;
use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::prompt::Prompt;
use super::GenerationError;

pub const TEMPERATURE: f32 = 0.2;
/// Room for a question, four options and the JSON punctuation around them.
pub const MAX_TOKENS: u32 = 800;

const RETRY_MIN_DELAY: Duration = Duration::from_millis(250);

#[cfg_attr(test, mockall::automock)]
pub trait CompletionClient: Send + Sync {
    /// Send the prompt and return the first choice's raw text.
    fn complete(
        &self,
        prompt: &Prompt,
    ) -> impl Future<Output = Result<String, GenerationError>> + Send;
}

#[derive(Clone, Debug)]
pub struct ChatClientConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
    pub max_retries: usize,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Error)]
enum AttemptError {
    #[error("{0}")]
    Transient(String),
    #[error("{0}")]
    Fatal(String),
}

impl AttemptError {
    fn is_transient(&self) -> bool {
        matches!(self, AttemptError::Transient(_))
    }
}

/// OpenAI-compatible chat-completion client.
#[derive(Clone)]
pub struct ChatCompletionClient {
    http: reqwest::Client,
    config: ChatClientConfig,
}

impl ChatCompletionClient {
    pub fn new(config: ChatClientConfig) -> color_eyre::Result<Self> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { http, config })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    async fn attempt(&self, prompt: &Prompt) -> Result<String, AttemptError> {
        let body = ChatRequest {
            model: &self.config.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &prompt.system,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt.user,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let resp = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() || e.is_connect() {
                    AttemptError::Transient(format!("request failed: {e}"))
                } else {
                    AttemptError::Fatal(format!("request failed: {e}"))
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            tracing::error!("completion API error: {status} - {text}");
            let message = format!("completion API returned {status}");
            return Err(if status.as_u16() == 429 || status.is_server_error() {
                AttemptError::Transient(message)
            } else {
                AttemptError::Fatal(message)
            });
        }

        let parsed: ChatResponse = resp.json().await.map_err(|e| {
            if e.is_timeout() {
                AttemptError::Transient(format!("reading response timed out: {e}"))
            } else {
                AttemptError::Fatal(format!("unexpected response body: {e}"))
            }
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| AttemptError::Fatal("response contained no choices".to_string()))
    }
}

impl CompletionClient for ChatCompletionClient {
    async fn complete(&self, prompt: &Prompt) -> Result<String, GenerationError> {
        let backoff = ExponentialBuilder::default()
            .with_min_delay(RETRY_MIN_DELAY)
            .with_max_times(self.config.max_retries);

        (|| async { self.attempt(prompt).await })
            .retry(&backoff)
            .when(AttemptError::is_transient)
            .notify(|e, delay| {
                tracing::warn!("completion attempt failed, retrying in {delay:?}: {e}");
            })
            .await
            .map_err(|e| GenerationError::Upstream(e.to_string()))
    }
}
