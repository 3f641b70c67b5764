//! Refinement proxy.
//!
//! Takes raw text, wraps it in the fixed instruction template and asks the
//! generation service for a restructured version. Validation failures are
//! reported as [`RefineError::InvalidInput`] before any network call; every
//! downstream problem (transport, status, malformed body, missing key,
//! timeout) collapses into [`RefineError::RefinementFailed`] after being
//! logged.

mod error;
mod provider;
mod proxy;
mod template;
mod usage;

pub use error::{ProviderError, RefineError};
pub use provider::{Completion, CompletionProvider, CompletionRequest, OpenAiProvider};
pub use proxy::{validate_text, RefineSettings, Refinement, RefinementProxy};
pub use template::{refinement_messages, ChatMessage, Role, SYSTEM_PROMPT};
pub use usage::UsageMetadata;
