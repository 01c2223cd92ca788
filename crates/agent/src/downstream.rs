//! Client for the per-intent banking data endpoints.

use std::time::Duration;

use async_trait::async_trait;
use dialogbridge_core::DownstreamError;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::llm::truncate;

const ERROR_BODY_LIMIT: usize = 300;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DownstreamPayload {
    pub user_text: String,
    pub parameters: Value,
    pub sentiment: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct DownstreamAnswer {
    pub response: String,
}

#[async_trait]
pub trait DownstreamClient: Send + Sync {
    async fn call(
        &self,
        endpoint: &str,
        payload: &DownstreamPayload,
    ) -> Result<DownstreamAnswer, DownstreamError>;
}

/// POSTs the payload as JSON and expects `{"response": "..."}` back. Any
/// non-2xx status or timeout is a failure; there is no retry.
pub struct HttpDownstreamClient {
    http: Client,
    timeout_secs: u64,
}

impl HttpDownstreamClient {
    pub fn new(timeout_secs: u64) -> Result<Self, DownstreamError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|error| DownstreamError::Transport(error.to_string()))?;
        Ok(Self { http, timeout_secs })
    }
}

#[async_trait]
impl DownstreamClient for HttpDownstreamClient {
    async fn call(
        &self,
        endpoint: &str,
        payload: &DownstreamPayload,
    ) -> Result<DownstreamAnswer, DownstreamError> {
        let response = self.http.post(endpoint).json(payload).send().await.map_err(|error| {
            if error.is_timeout() {
                DownstreamError::Timeout { timeout_secs: self.timeout_secs }
            } else {
                DownstreamError::Transport(error.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DownstreamError::Status {
                status: status.as_u16(),
                body: truncate(&body, ERROR_BODY_LIMIT),
            });
        }

        response.json::<DownstreamAnswer>().await.map_err(|error| {
            if error.is_timeout() {
                DownstreamError::Timeout { timeout_secs: self.timeout_secs }
            } else {
                DownstreamError::Decode(error.to_string())
            }
        })
    }
}
