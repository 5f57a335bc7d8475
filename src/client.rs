// HTTP client for the tour REST API, used by the card-grid CLI to fetch
// tours before rendering them. Transient failures are retried with
// exponential backoff and jitter.

use crate::tour::{Tour, TourFilter, TourSummary};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout after {0}ms")]
    Timeout(u64),

    #[error("API error: {status_code} - {message}")]
    ApiResponseError {
        status_code: u16,
        message: String,
        is_retryable: bool,
    },

    #[error("Decode error: {0}")]
    DecodeError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl ClientError {
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::NetworkError(_) | ClientError::Timeout(_) => true,
            ClientError::ApiResponseError { is_retryable, .. } => *is_retryable,
            ClientError::DecodeError(_) | ClientError::ConfigError(_) => false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout_ms: u64,
    pub retry_config: RetryConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            timeout_ms: 5000,
            retry_config: RetryConfig::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub backoff_multiplier: f64,
    pub jitter_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff_ms: 100,
            max_backoff_ms: 10000,
            backoff_multiplier: 2.0,
            jitter_factor: 0.1,
        }
    }
}

// Exponential backoff capped at max_backoff_ms, spread by +/- jitter_factor / 2
pub fn calculate_backoff(retry_attempt: u32, config: &RetryConfig) -> Duration {
    let base_backoff_ms = (config.initial_backoff_ms as f64
        * config.backoff_multiplier.powf(retry_attempt as f64))
    .min(config.max_backoff_ms as f64);

    let jitter = rand::random::<f64>() * config.jitter_factor * base_backoff_ms;
    let backoff_ms = base_backoff_ms * (1.0 - config.jitter_factor / 2.0) + jitter;

    Duration::from_millis(backoff_ms as u64)
}

pub struct TourApiClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl TourApiClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        if !config.base_url.starts_with("http://") && !config.base_url.starts_with("https://") {
            return Err(ClientError::ConfigError(format!(
                "base_url must be an http(s) URL, got '{}'",
                config.base_url
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| ClientError::ConfigError(e.to_string()))?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub async fn list_tours(&self, filter: &TourFilter) -> Result<Vec<TourSummary>, ClientError> {
        let query = filter_query(filter);
        self.get_json("/tours", &query).await
    }

    pub async fn get_tour(&self, id: u64) -> Result<Tour, ClientError> {
        self.get_json(&format!("/tours/{}", id), &[]).await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ClientError> {
        let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), path);
        let retry = &self.config.retry_config;
        let mut attempt = 0;

        loop {
            match self.send_once(&url, query).await {
                Ok(body) => return Ok(body),
                Err(e) if e.is_retryable() && attempt < retry.max_retries => {
                    let backoff = calculate_backoff(attempt, retry);
                    warn!(
                        url = %url,
                        attempt = attempt + 1,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %e,
                        "retrying request"
                    );
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn send_once<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, ClientError> {
        debug!(url = %url, "GET");
        let response = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::ApiResponseError {
                status_code: status.as_u16(),
                message: error_message(&body).unwrap_or_else(|| status.to_string()),
                is_retryable: status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ClientError::DecodeError(e.to_string()))
    }

    fn transport_error(&self, err: reqwest::Error) -> ClientError {
        if err.is_timeout() {
            ClientError::Timeout(self.config.timeout_ms)
        } else {
            ClientError::NetworkError(err.to_string())
        }
    }
}

fn filter_query(filter: &TourFilter) -> Vec<(&'static str, String)> {
    let mut query = Vec::new();
    if let Some(status) = filter.status {
        query.push(("status", status.as_str().to_string()));
    }
    if let Some(search) = &filter.search {
        query.push(("search", search.clone()));
    }
    if let Some(location) = &filter.location {
        query.push(("location", location.clone()));
    }
    if let Some(min) = filter.min_price {
        query.push(("minPrice", min.to_string()));
    }
    if let Some(max) = filter.max_price {
        query.push(("maxPrice", max.to_string()));
    }
    query
}

// Pulls `message` out of the server's JSON error body
fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()?
        .get("message")?
        .as_str()
        .map(str::to_string)
}
