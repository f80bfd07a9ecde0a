//! Storage node dashboard API client.
//!
//! Endpoints (relative to `{base}/api/`):
//! - `sno/` node overview
//! - `sno/estimated-payout` payout estimation
//! - `sno/satellite/{id}` per-satellite detail
//!
//! Calls either succeed with a snapshot or fall back to the empty snapshot;
//! failures are logged here and never reach the collectors.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::ExporterConfig;
use crate::error::ApiError;
use crate::models::{from_payload, NodeSnapshot, PayoutSnapshot, SatelliteSnapshot};

pub const DEFAULT_API_PATH: &str = "/api/";
const INITIAL_BACKOFF: Duration = Duration::from_millis(100);
const MAX_BACKOFF: Duration = Duration::from_secs(2);

/// What the collectors need from the storage node.
#[async_trait]
pub trait NodeApi: Send + Sync {
    async fn node(&self) -> NodeSnapshot;
    async fn payout(&self) -> PayoutSnapshot;
    async fn satellite(&self, id: &str) -> SatelliteSnapshot;
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    api_url: String,
    retries: u32,
    backoff: Duration,
}

impl ApiClient {
    pub fn new(base_url: &str, path: &str, timeout: Duration, retries: u32) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("storj-exporter/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            api_url: format!("{}{}", base_url.trim_end_matches('/'), path),
            retries,
            backoff: INITIAL_BACKOFF,
        })
    }

    pub fn from_config(config: &ExporterConfig) -> Result<Self, reqwest::Error> {
        Self::new(
            &config.base_url(),
            &config.api_path,
            Duration::from_secs(config.api_timeout_secs),
            config.api_retries,
        )
    }

    /// First retry delay; doubles on every further attempt.
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn backoff_for(&self, attempt: u32) -> Duration {
        self.backoff
            .saturating_mul(2u32.saturating_pow(attempt))
            .min(MAX_BACKOFF.max(self.backoff))
    }

    /// GET `endpoint` and parse the body as JSON, retrying transient failures.
    pub async fn get_json(&self, endpoint: &str) -> Result<Value, ApiError> {
        let url = format!("{}{}", self.api_url, endpoint);
        let mut attempt = 0;
        loop {
            match self.get_once(&url).await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < self.retries && e.is_retryable() => {
                    let delay = self.backoff_for(attempt);
                    attempt += 1;
                    debug!(url = %url, attempt, delay_ms = delay.as_millis() as u64, error = %e, "retrying upstream request");
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn get_once(&self, url: &str) -> Result<Value, ApiError> {
        let response = self.http.get(url).send().await.map_err(|source| ApiError::Transport {
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = response.bytes().await.map_err(|source| ApiError::Transport {
            url: url.to_string(),
            source,
        })?;
        serde_json::from_slice(&body).map_err(|source| ApiError::Decode {
            url: url.to_string(),
            source,
        })
    }

    async fn fetch<T: DeserializeOwned + Default>(&self, endpoint: &str) -> T {
        match self.get_json(endpoint).await {
            Ok(payload) => from_payload(payload),
            Err(e) => {
                warn!(endpoint, error = %e, "upstream request failed, using empty snapshot");
                T::default()
            }
        }
    }
}

#[async_trait]
impl NodeApi for ApiClient {
    async fn node(&self) -> NodeSnapshot {
        self.fetch("sno/").await
    }

    async fn payout(&self) -> PayoutSnapshot {
        self.fetch("sno/estimated-payout").await
    }

    async fn satellite(&self, id: &str) -> SatelliteSnapshot {
        self.fetch(&format!("sno/satellite/{id}")).await
    }
}
