//! Generation service client.
//!
//! [`CompletionProvider`] is the seam between the proxy and the hosted model.
//! [`OpenAiProvider`] implements it against the OpenAI chat-completions API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::ProviderError;
use super::template::ChatMessage;
use super::usage::UsageMetadata;

/// Longest slice of an error body kept for logs.
const MAX_ERROR_BODY_CHARS: usize = 2_000;

/// A single chat completion call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// What the service returned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Completion {
    /// Generated text, `None` when the service produced no content.
    pub content: Option<String>,
    pub usage: UsageMetadata,
}

/// A hosted text-generation service.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Run one completion. Called exactly once per refine request.
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, ProviderError>;

    /// Provider name for logs.
    fn name(&self) -> &str;
}

/// OpenAI-compatible chat-completions client.
#[derive(Debug, Clone)]
pub struct OpenAiProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    api_key_env: String,
}

impl OpenAiProvider {
    /// Build a client for `base_url` (e.g. `https://api.openai.com/v1`).
    ///
    /// A missing `api_key` is allowed; every call then fails with
    /// [`ProviderError::MissingApiKey`].
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        api_key_env: impl Into<String>,
        connect_timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            api_key_env: api_key_env.into(),
        })
    }

    /// Read the key from the environment variable `api_key_env`.
    pub fn from_env(
        base_url: impl Into<String>,
        api_key_env: impl Into<String>,
        connect_timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let api_key_env = api_key_env.into();
        let api_key = std::env::var(&api_key_env).ok();
        Self::new(base_url, api_key, api_key_env, connect_timeout)
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Value,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    #[serde(default)]
    message: Option<ChatChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, ProviderError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(ProviderError::MissingApiKey(self.api_key_env.clone()));
        };

        tracing::debug!(
            model = %request.model,
            endpoint = %self.endpoint(),
            "sending chat completion"
        );

        let response = self
            .client
            .post(self.endpoint())
            .header(AUTHORIZATION, format!("Bearer {}", api_key))
            .header(CONTENT_TYPE, "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::debug!(request_id = request_id(&headers), "upstream rejected request");
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        let parsed: ChatCompletionResponse =
            serde_json::from_str(&body).map_err(|err| ProviderError::Malformed(err.to_string()))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content);

        Ok(Completion {
            content,
            usage: UsageMetadata::new(parsed.usage),
        })
    }

    fn name(&self) -> &str {
        "openai"
    }
}

fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("<none>")
}
