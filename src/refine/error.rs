use thiserror::Error;

/// User-facing errors of the refinement proxy.
///
/// The display strings are the exact messages returned to clients; the
/// cause of a [`RefineError::RefinementFailed`] is kept for logging only.
#[derive(Error, Debug)]
pub enum RefineError {
    /// Text missing, empty, or not a string. No upstream call was made.
    #[error("Invalid input text")]
    InvalidInput,

    /// Anything between the proxy and the generation service went wrong.
    #[error("Failed to refine prompt")]
    RefinementFailed {
        #[source]
        cause: ProviderError,
    },
}

impl RefineError {
    pub fn failed(cause: ProviderError) -> Self {
        Self::RefinementFailed { cause }
    }

    /// Short label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::InvalidInput => "invalid_input",
            Self::RefinementFailed { cause } => cause.label(),
        }
    }
}

/// Errors talking to the generation service.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// No credential configured.
    #[error("API key not set (expected in ${0})")]
    MissingApiKey(String),

    /// Connection, TLS or body transfer failure.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("upstream returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body was not the expected shape.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// The call did not finish in time.
    #[error("timed out after {0:?}")]
    Timeout(std::time::Duration),
}

impl ProviderError {
    pub fn label(&self) -> &'static str {
        match self {
            Self::MissingApiKey(_) => "missing_api_key",
            Self::Transport(_) => "transport",
            Self::Status { .. } => "upstream_status",
            Self::Malformed(_) => "malformed_response",
            Self::Timeout(_) => "timeout",
        }
    }
}
