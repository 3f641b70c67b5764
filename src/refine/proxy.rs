use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::{ProviderError, RefineError};
use super::provider::{CompletionProvider, CompletionRequest};
use super::template::refinement_messages;
use super::usage::UsageMetadata;

/// Generation settings sent with every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefineSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for RefineSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.3,
            max_tokens: 2_000,
        }
    }
}

/// Result of a successful refine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Refinement {
    /// Generated text, verbatim. Empty when the service returned nothing.
    pub refined_text: String,
    pub usage: UsageMetadata,
}

/// Stateless proxy between callers and the generation service.
///
/// Cloning is cheap and every call is independent, so one instance can be
/// shared by all request handlers.
#[derive(Clone)]
pub struct RefinementProxy {
    provider: Arc<dyn CompletionProvider>,
    settings: RefineSettings,
    timeout: Duration,
}

impl RefinementProxy {
    pub fn new(
        provider: Arc<dyn CompletionProvider>,
        settings: RefineSettings,
        timeout: Duration,
    ) -> Self {
        Self {
            provider,
            settings,
            timeout,
        }
    }

    pub fn settings(&self) -> &RefineSettings {
        &self.settings
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Refine a request body's `text` field.
    ///
    /// Validation happens before anything is sent upstream.
    pub async fn refine_value(&self, text: Option<&Value>) -> Result<Refinement, RefineError> {
        let text = validate_text(text)?;
        self.refine(text).await
    }

    /// Refine `text`.
    pub async fn refine(&self, text: &str) -> Result<Refinement, RefineError> {
        if text.is_empty() {
            return Err(RefineError::InvalidInput);
        }

        let request = CompletionRequest {
            model: self.settings.model.clone(),
            messages: refinement_messages(text),
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        };

        let outcome = tokio::time::timeout(self.timeout, self.provider.complete(request))
            .await
            .unwrap_or(Err(ProviderError::Timeout(self.timeout)));

        match outcome {
            Ok(completion) => {
                let refined_text = completion.content.unwrap_or_default();
                tracing::debug!(
                    provider = self.provider.name(),
                    input_chars = text.len(),
                    output_chars = refined_text.len(),
                    "refinement complete"
                );
                Ok(Refinement {
                    refined_text,
                    usage: completion.usage,
                })
            }
            Err(cause) => {
                tracing::error!(
                    provider = self.provider.name(),
                    kind = cause.label(),
                    error = %cause,
                    "error refining prompt"
                );
                Err(RefineError::failed(cause))
            }
        }
    }
}

/// Accept only a non-empty JSON string.
pub fn validate_text(value: Option<&Value>) -> Result<&str, RefineError> {
    match value {
        Some(Value::String(text)) if !text.is_empty() => Ok(text.as_str()),
        _ => Err(RefineError::InvalidInput),
    }
}
