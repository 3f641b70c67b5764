//! Token counting and cost estimation for prompt text.
//!
//! Input text is counted with the BPE encoding of the target model family and
//! priced with fixed per-token rates. The output side of the estimate is a
//! heuristic: generated text is assumed to be a fixed multiple of the input
//! length, so every figure produced here is approximate.
//!
//! # Overview
//!
//! - **TokenRates**: per-million token prices and the output-length multiplier
//! - **TokenEstimator**: counts tokens and derives a [`CostEstimate`]
//! - **TokenCount**: input/output counters, used for reported usage
//!
//! # Example
//!
//! ```ignore
//! use prompt_refiner::estimate::TokenEstimator;
//!
//! let estimator = TokenEstimator::default();
//! let estimate = estimator.estimate("Summarise the attached meeting notes.");
//! println!("{}", estimate);
//! ```

mod config;
mod estimator;

pub use config::TokenRates;
pub use estimator::{CostEstimate, EstimationMethod, TokenCount, TokenEstimator};
