//! Refine backend that talks to a running proxy over HTTP.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::json;
use url::Url;

use super::driver::RefineBackend;
use crate::refine::{ProviderError, RefineError, Refinement};
use crate::server::RefineResponse;

/// Client for `POST /refine` on a proxy server.
#[derive(Debug, Clone)]
pub struct HttpRefineBackend {
    client: reqwest::Client,
    endpoint: Url,
    timeout: Duration,
}

impl HttpRefineBackend {
    /// `server` is the proxy's base URL, e.g. `http://127.0.0.1:3000` or
    /// `http://host/api`. A path prefix is kept whether or not it ends in `/`.
    pub fn new(server: &Url, timeout: Duration) -> Result<Self, ProviderError> {
        let mut base = server.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let endpoint = base
            .join("refine")
            .map_err(|err| ProviderError::Malformed(format!("invalid server url: {err}")))?;
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            timeout,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl RefineBackend for HttpRefineBackend {
    async fn refine(&self, text: &str) -> Result<Refinement, RefineError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&json!({ "text": text }))
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    RefineError::failed(ProviderError::Timeout(self.timeout))
                } else {
                    RefineError::failed(ProviderError::Transport(err))
                }
            })?;

        let status = response.status();
        if status == StatusCode::BAD_REQUEST {
            return Err(RefineError::InvalidInput);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RefineError::failed(ProviderError::Status {
                status: status.as_u16(),
                body,
            }));
        }

        let body: RefineResponse = response
            .json()
            .await
            .map_err(|err| RefineError::failed(ProviderError::Malformed(err.to_string())))?;

        Ok(Refinement {
            refined_text: body.refined_prompt,
            usage: body.usage,
        })
    }
}
