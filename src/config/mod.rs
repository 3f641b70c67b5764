//! Application configuration.
//!
//! Settings come from an optional TOML file layered under environment
//! variables prefixed with `PROMPT_REFINER_` (nested keys use `__`, e.g.
//! `PROMPT_REFINER_SERVER__BIND=0.0.0.0:8080`). Every field has a default.
//! The API key itself is never stored here; only the name of the variable
//! that holds it.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::estimate::{TokenEstimator, TokenRates};
use crate::refine::{OpenAiProvider, ProviderError, RefineSettings, RefinementProxy};
use crate::timeout::TimeoutConfig;

/// Environment variable prefix for overrides.
pub const ENV_PREFIX: &str = "PROMPT_REFINER";

/// Default configuration file, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "prompt-refiner.toml";

/// Errors loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("configuration file not found: {0}")]
    NotFound(String),
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to listen on
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3000".to_string(),
        }
    }
}

/// Generation service settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Base URL of the OpenAI-compatible API
    pub base_url: String,
    /// Model identifier
    pub model: String,
    /// Sampling temperature (low for near-deterministic output)
    pub temperature: f32,
    /// Upper bound on generated tokens
    pub max_tokens: u32,
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        let settings = RefineSettings::default();
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: settings.model,
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
            api_key_env: "OPENAI_API_KEY".to_string(),
        }
    }
}

impl ProviderConfig {
    pub fn refine_settings(&self) -> RefineSettings {
        RefineSettings {
            model: self.model.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub provider: ProviderConfig,
    pub timeouts: TimeoutConfig,
    pub pricing: TokenRates,
}

impl AppConfig {
    /// Load configuration.
    ///
    /// With `path`, the file must exist. Without it, [`DEFAULT_CONFIG_FILE`]
    /// is used when present. Environment overrides apply in both cases.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound(path.display().to_string()));
                }
                config::File::from(path).required(true)
            }
            None => config::File::with_name(DEFAULT_CONFIG_FILE)
                .format(config::FileFormat::Toml)
                .required(false),
        };

        let settings = config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Parse configuration from a TOML string, without environment overrides.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    /// Build the refinement proxy, reading the API key from the environment.
    ///
    /// A missing key is logged and tolerated; refine calls will fail.
    pub fn build_proxy(&self) -> Result<RefinementProxy, ProviderError> {
        let provider = OpenAiProvider::from_env(
            self.provider.base_url.clone(),
            self.provider.api_key_env.clone(),
            self.timeouts.connect_timeout(),
        )?;
        if !provider.has_api_key() {
            tracing::warn!(
                variable = %self.provider.api_key_env,
                "API key not set; refine requests will fail"
            );
        }
        Ok(RefinementProxy::new(
            Arc::new(provider),
            self.provider.refine_settings(),
            self.timeouts.refine_timeout(),
        ))
    }

    /// Build the token estimator for the configured pricing.
    pub fn build_estimator(&self) -> TokenEstimator {
        TokenEstimator::with_rates(self.pricing.clone())
    }
}
