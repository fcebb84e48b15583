//! Page fetching for `url` content sources.

use super::error::ContentError;
use super::retry_policy::RetryPolicy;
use crate::config::ExtractionSettings;
use anyhow::Result;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

/// Retrieves the raw HTML of a page.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, ContentError>;
}

pub struct ReqwestPageFetcher {
    client: Client,
    retry_policy: RetryPolicy,
}

impl ReqwestPageFetcher {
    pub fn new(settings: &ExtractionSettings) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));

        let client = Client::builder()
            .user_agent(settings.user_agent.as_str())
            .default_headers(headers)
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            retry_policy: RetryPolicy::new(settings),
        })
    }

    async fn fetch_once(&self, url: &str) -> Result<String, ContentError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ContentError::Fetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ContentError::HttpStatus(status.as_u16()));
        }

        response
            .text()
            .await
            .map_err(|e| ContentError::Fetch(e.to_string()))
    }
}

#[async_trait]
impl PageFetcher for ReqwestPageFetcher {
    async fn fetch(&self, url: &str) -> Result<String, ContentError> {
        let mut retry_count = 0;
        loop {
            match self.fetch_once(url).await {
                Ok(body) => {
                    debug!(url, bytes = body.len(), retry_count, "Fetched page");
                    return Ok(body);
                }
                Err(e) if self.retry_policy.should_retry(e.is_retryable(), retry_count) => {
                    let backoff = self.retry_policy.backoff(retry_count);
                    warn!(
                        url,
                        error = %e,
                        backoff_ms = backoff.as_millis() as u64,
                        "Page fetch failed, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                    retry_count += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
