//! HTTP client for the price-comparison site's search endpoint.

use std::time::Duration;

use reqwest::Client;
use trolley_core::AppConfig;

use crate::error::ScraperError;

/// HTTP client for the aggregator's `/search` page.
///
/// Sends a browser-like header set so the request is served the same HTML a
/// real visitor would get. This is best-effort: the target can still decide
/// to block or challenge the request. Non-2xx responses and transport
/// failures surface as typed errors; no retries are performed at this layer
/// (the response cache in front of the orchestrator absorbs repeat demand).
pub struct TrolleyClient {
    client: Client,
    base_url: String,
}

impl TrolleyClient {
    /// Creates a client with the configured timeout and `User-Agent`.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed (e.g., invalid TLS config).
    pub fn new(
        base_url: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    /// Creates a client from application configuration.
    ///
    /// # Errors
    ///
    /// Same as [`TrolleyClient::new`].
    pub fn from_config(config: &AppConfig) -> Result<Self, ScraperError> {
        Self::new(
            &config.base_url,
            config.request_timeout_secs,
            &config.user_agent,
        )
    }

    /// Site origin used to resolve relative product links.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetches the raw search results markup for `query`.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::UnexpectedStatus`] — any non-2xx response.
    /// - [`ScraperError::Http`] — network, TLS, or timeout failure.
    /// - [`ScraperError::Parse`] — the response body is empty, so no
    ///   document tree can be built from it.
    pub async fn fetch_search_page(&self, query: &str) -> Result<String, ScraperError> {
        let url = self.search_url(query)?;

        let response = self
            .client
            .get(url.clone())
            .header(
                reqwest::header::ACCEPT,
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            )
            .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.5")
            .header(reqwest::header::UPGRADE_INSECURE_REQUESTS, "1")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScraperError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        if body.trim().is_empty() {
            return Err(ScraperError::Parse {
                reason: format!("empty response body from {url}"),
            });
        }

        Ok(body)
    }

    /// Builds the search URL with the query and the fixed relevance sort.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidBaseUrl`] if the configured base URL
    /// cannot be parsed.
    fn search_url(&self, query: &str) -> Result<reqwest::Url, ScraperError> {
        let base = format!("{}/search", self.base_url);
        let mut url = reqwest::Url::parse(&base).map_err(|e| ScraperError::InvalidBaseUrl {
            url: self.base_url.clone(),
            reason: e.to_string(),
        })?;

        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("sort", "relevance");

        Ok(url)
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
