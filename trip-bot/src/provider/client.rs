//! Schedule search HTTP client.
//!
//! Queries a rasp-style `/v3.0/search/` endpoint for suburban trains
//! between two stations on a given date.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::Semaphore;

use crate::domain::{ScheduleOption, StationCode};

use super::ScheduleProvider;
use super::error::ProviderError;
use super::types::SearchResponse;

/// Default base URL for the schedule API.
const DEFAULT_BASE_URL: &str = "https://api.rasp.yandex-net.ru";

/// Default maximum concurrent requests.
const DEFAULT_MAX_CONCURRENT: usize = 5;

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Configuration for the schedule client.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// API key sent as the `apikey` query parameter
    pub api_key: String,
    /// Base URL for the API
    pub base_url: String,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl ProviderConfig {
    /// Create a new config with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set maximum concurrent requests.
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Schedule API client.
///
/// Uses a semaphore to limit concurrent requests and avoid rate limiting.
#[derive(Debug, Clone)]
pub struct ScheduleClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    semaphore: Arc<Semaphore>,
}

impl ScheduleClient {
    /// Create a new client with the given configuration.
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
            semaphore: Arc::new(Semaphore::new(config.max_concurrent.max(1))),
        })
    }

    /// Query parameters for a search, in the order the API documents them.
    fn search_params(
        &self,
        from: &StationCode,
        to: &StationCode,
        date: NaiveDate,
    ) -> Vec<(&'static str, String)> {
        vec![
            ("apikey", self.api_key.clone()),
            ("format", "json".to_string()),
            ("transport_types", "suburban".to_string()),
            ("from", from.as_str().to_string()),
            ("to", to.as_str().to_string()),
            ("lang", "ru_RU".to_string()),
            ("page", "1".to_string()),
            ("date", date.format("%Y-%m-%d").to_string()),
        ]
    }

    /// Search for suburban trains between two stations on a date.
    pub async fn search(
        &self,
        from: &StationCode,
        to: &StationCode,
        date: NaiveDate,
    ) -> Result<Vec<ScheduleOption>, ProviderError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| ProviderError::Api {
                status: 0,
                message: "Semaphore closed".to_string(),
            })?;

        let url = format!("{}/v3.0/search/", self.base_url);
        tracing::debug!(from = %from, to = %to, %date, "querying schedule");

        let response = self
            .http
            .get(&url)
            .query(&self.search_params(from, to, date))
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ProviderError::Unauthorized);
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;

        let parsed: SearchResponse =
            serde_json::from_str(&body).map_err(|e| ProviderError::Json {
                message: e.to_string(),
                body: Some(body.chars().take(500).collect()),
            })?;

        Ok(parsed.into_options())
    }
}

#[async_trait]
impl ScheduleProvider for ScheduleClient {
    async fn get_options(
        &self,
        from: &StationCode,
        to: &StationCode,
        date: NaiveDate,
    ) -> Result<Vec<ScheduleOption>, ProviderError> {
        self.search(from, to, date).await
    }
}
