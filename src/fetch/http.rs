//! HTTP page fetcher.

use std::time::Duration;

use super::{FetchError, PageFetcher};

/// Fetches pages with a plain unauthenticated GET.
pub struct HttpFetcher {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self { client, timeout })
    }
}

impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::new(url, format!("timed out after {:?}", self.timeout))
            } else {
                FetchError::new(url, e)
            }
        })?;

        let response = response
            .error_for_status()
            .map_err(|e| FetchError::new(url, e))?;

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::new(url, e))?;

        tracing::debug!("Fetched {} ({} bytes)", url, body.len());
        Ok(body.to_vec())
    }
}
