//! Pricing configuration for cost estimates.

use serde::{Deserialize, Serialize};

use super::estimator::TokenCount;

const TOKENS_PER_MILLION: f64 = 1_000_000.0;

/// Price per million tokens for the target model, in US dollars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenRates {
    /// Cost per 1M input tokens (USD)
    pub input_per_million: f64,
    /// Cost per 1M output tokens (USD)
    pub output_per_million: f64,
    /// Assumed ratio of generated tokens to input tokens.
    /// This is a heuristic, not a measured output length.
    pub output_multiplier: f64,
    /// Model name for reference
    pub model_name: String,
}

impl Default for TokenRates {
    fn default() -> Self {
        Self::gpt_4o_mini()
    }
}

impl TokenRates {
    /// Rates for `gpt-4o-mini`: $0.15 per 1M input, $0.60 per 1M output,
    /// output assumed to be twice the input.
    pub fn gpt_4o_mini() -> Self {
        Self {
            input_per_million: 0.15,
            output_per_million: 0.60,
            output_multiplier: 2.0,
            model_name: "gpt-4o-mini".to_string(),
        }
    }

    /// Set the input rate.
    pub fn with_input_rate(mut self, per_million: f64) -> Self {
        self.input_per_million = per_million.max(0.0);
        self
    }

    /// Set the output rate.
    pub fn with_output_rate(mut self, per_million: f64) -> Self {
        self.output_per_million = per_million.max(0.0);
        self
    }

    /// Set the output-length multiplier.
    pub fn with_output_multiplier(mut self, multiplier: f64) -> Self {
        self.output_multiplier = multiplier.max(0.0);
        self
    }

    /// Estimated cost of sending `tokens` input tokens and receiving
    /// `tokens * output_multiplier` output tokens.
    pub fn estimated_cost(&self, tokens: u64) -> f64 {
        let input = tokens as f64;
        let output = input * self.output_multiplier;
        self.cost_of(input, output)
    }

    /// Cost of a completed call given the counts the provider reported.
    pub fn actual_cost(&self, usage: TokenCount) -> f64 {
        self.cost_of(usage.input_tokens as f64, usage.output_tokens as f64)
    }

    fn cost_of(&self, input_tokens: f64, output_tokens: f64) -> f64 {
        let input_cost = (input_tokens / TOKENS_PER_MILLION) * self.input_per_million;
        let output_cost = (output_tokens / TOKENS_PER_MILLION) * self.output_per_million;
        input_cost + output_cost
    }
}
