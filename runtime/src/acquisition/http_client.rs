//! Async HTTP client wrapping reqwest.
//!
//! Not a browser, just one GET with a fixed user agent and timeout.

use super::{FetchError, StaticFetcher};
use async_trait::async_trait;
use std::time::Duration;

/// HTTP client for the static side of the pipeline.
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpClient {
    /// Create a client sending `user_agent` and bounded by `timeout_ms`.
    pub fn new(user_agent: &str, timeout_ms: u64) -> Self {
        let timeout = Duration::from_millis(timeout_ms);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(user_agent)
            .build()
            .unwrap_or_default();

        Self { client, timeout }
    }

    /// Perform a single GET and return the body of a success response.
    pub async fn get(&self, url: &str) -> Result<String, FetchError> {
        let parsed = url::Url::parse(url).map_err(|source| FetchError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;

        let transport = |source: reqwest::Error| FetchError::Transport {
            url: url.to_string(),
            source,
        };

        let resp = self
            .client
            .get(parsed)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(transport)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: resp.url().to_string(),
            });
        }

        resp.text().await.map_err(transport)
    }
}

#[async_trait]
impl StaticFetcher for HttpClient {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        tracing::debug!(url, "static fetch");
        self.get(url).await
    }
}
