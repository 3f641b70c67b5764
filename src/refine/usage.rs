//! Usage counters reported by the generation service.
//!
//! The counters are passed through to clients untouched. For display, the
//! two common shapes can be read back:
//!
//! - **OpenAI**: `{"prompt_tokens": N, "completion_tokens": N, "total_tokens": N}`
//! - **Anthropic**: `{"input_tokens": N, "output_tokens": N}`

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::estimate::TokenCount;

/// Opaque usage metadata, serialized exactly as the service sent it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UsageMetadata(Value);

/// OpenAI usage format.
#[derive(Debug, Deserialize)]
struct OpenAIUsage {
    prompt_tokens: u64,
    completion_tokens: u64,
}

/// Anthropic usage format.
#[derive(Debug, Deserialize)]
struct AnthropicUsage {
    input_tokens: u64,
    output_tokens: u64,
}

impl UsageMetadata {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// No usage was reported.
    pub fn is_empty(&self) -> bool {
        self.0.is_null()
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Read the counters if they are in a known shape.
    pub fn token_count(&self) -> Option<TokenCount> {
        if let Ok(openai) = serde_json::from_value::<OpenAIUsage>(self.0.clone()) {
            return Some(TokenCount::new(openai.prompt_tokens, openai.completion_tokens));
        }

        if let Ok(anthropic) = serde_json::from_value::<AnthropicUsage>(self.0.clone()) {
            return Some(TokenCount::new(anthropic.input_tokens, anthropic.output_tokens));
        }

        None
    }
}

impl From<Value> for UsageMetadata {
    fn from(value: Value) -> Self {
        Self(value)
    }
}
