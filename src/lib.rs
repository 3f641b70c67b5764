//! Prompt refiner.
//!
//! An HTTP proxy that rewrites rough prompts into structured ones through an
//! OpenAI-compatible chat completions API, plus the pieces a client needs
//! around it: live token and cost estimates, word-level diffs between input
//! and output, bounded history and shareable links.
//!
//! # Modules
//!
//! - [`refine`]: validation, instruction template and the upstream call
//! - [`server`]: axum router exposing `/refine`, `/estimate`, `/diff`
//! - [`estimate`]: token counting and cost estimation
//! - [`diff`]: word diff and its renderers
//! - [`session`]: client state machine, storage and share links
//! - [`config`]: layered TOML and environment configuration

pub mod config;
pub mod diff;
pub mod error;
pub mod estimate;
pub mod logging;
pub mod refine;
pub mod server;
pub mod session;
pub mod timeout;

pub use error::{Error, Result};
