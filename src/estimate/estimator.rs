//! Token estimation utilities.
//!
//! Counting uses the `o200k_base` encoding shared by the `gpt-4o` model
//! family, so counts line up with what the provider bills for input. When
//! the encoding tables cannot be loaded the estimator falls back to a
//! character heuristic.

use std::fmt;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tiktoken_rs::CoreBPE;

use super::config::TokenRates;

/// Shared encoder, built on first use.
static O200K: Lazy<Option<CoreBPE>> = Lazy::new(|| match tiktoken_rs::o200k_base() {
    Ok(bpe) => Some(bpe),
    Err(err) => {
        tracing::warn!(error = %err, "o200k_base encoding unavailable; using character heuristic");
        None
    }
});

/// Token counting strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EstimationMethod {
    /// BPE tokenization with the target model's encoding
    #[default]
    Bpe,
    /// Character-based estimation (3.5 chars ≈ 1 token)
    CharacterBased,
}

/// Token estimator that counts tokens and prices them.
#[derive(Debug, Clone, Default)]
pub struct TokenEstimator {
    method: EstimationMethod,
    rates: TokenRates,
}

impl TokenEstimator {
    /// Create a new estimator with the given method and rates.
    pub fn new(method: EstimationMethod, rates: TokenRates) -> Self {
        Self { method, rates }
    }

    /// Create a BPE estimator with custom rates.
    pub fn with_rates(rates: TokenRates) -> Self {
        Self::new(EstimationMethod::Bpe, rates)
    }

    /// The pricing used by this estimator.
    pub fn rates(&self) -> &TokenRates {
        &self.rates
    }

    /// Whether counts come from the real encoding rather than a heuristic.
    pub fn is_exact(&self) -> bool {
        self.method == EstimationMethod::Bpe && O200K.is_some()
    }

    /// Count tokens in `text`.
    pub fn count_tokens(&self, text: &str) -> u64 {
        if text.is_empty() {
            return 0;
        }

        match self.method {
            EstimationMethod::Bpe => match O200K.as_ref() {
                Some(bpe) => bpe.encode_ordinary(text).len() as u64,
                None => estimate_by_chars(text),
            },
            EstimationMethod::CharacterBased => estimate_by_chars(text),
        }
    }

    /// Count tokens in `text` and derive the approximate cost of refining it.
    pub fn estimate(&self, text: &str) -> CostEstimate {
        let tokens = self.count_tokens(text);
        CostEstimate {
            tokens,
            cost_usd: self.rates.estimated_cost(tokens),
        }
    }
}

/// Roughly 4 characters per token for English text; 3.5 errs on the high side.
fn estimate_by_chars(text: &str) -> u64 {
    let chars = text.chars().count();
    (chars as f64 / 3.5).ceil() as u64
}

/// Token count and derived cost for a piece of input text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostEstimate {
    /// Input tokens
    pub tokens: u64,
    /// Approximate cost in USD, including the assumed output
    pub cost_usd: f64,
}

impl CostEstimate {
    /// Whether there is anything to show.
    pub fn is_empty(&self) -> bool {
        self.tokens == 0
    }
}

impl fmt::Display for CostEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} tokens ≈${:.4}", self.tokens, self.cost_usd)
    }
}

/// Token count for an interaction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenCount {
    /// Input/prompt tokens
    pub input_tokens: u64,
    /// Output/completion tokens
    pub output_tokens: u64,
}

impl TokenCount {
    /// Create a new token count.
    pub fn new(input: u64, output: u64) -> Self {
        Self {
            input_tokens: input,
            output_tokens: output,
        }
    }

    /// Get total tokens.
    pub fn total(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }
}
