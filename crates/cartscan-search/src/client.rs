//! HTTP client for the Cornershop branch search API.
//!
//! Wraps `reqwest` with a fixed-count [`RetryPolicy`] and a politeness delay
//! that runs after every successful response, so back-to-back calls are spaced
//! out for the upstream API.

use std::time::Duration;

use reqwest::{Client, Url};

use crate::error::FetchError;
use crate::retry::{retry_with_policy, RetryPolicy};
use crate::types::SearchQuery;

const DEFAULT_BASE_URL: &str = "https://cornershopapp.com/";
const SEARCH_PATH: &str = "api/v2/branches/search";

/// Client for the branch search endpoint.
///
/// Use [`SearchClient::new`] for the production host or
/// [`SearchClient::with_base_url`] to point at a proxy or a mock server.
pub struct SearchClient {
    client: Client,
    search_url: Url,
    retry: RetryPolicy,
}

impl SearchClient {
    /// Creates a client pointed at the production search API.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Transport`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        retry: RetryPolicy,
    ) -> Result<Self, FetchError> {
        Self::with_base_url(DEFAULT_BASE_URL, timeout_secs, user_agent, retry)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Transport`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`FetchError::InvalidBaseUrl`] if `base_url`
    /// is not a valid URL.
    pub fn with_base_url(
        base_url: &str,
        timeout_secs: u64,
        user_agent: &str,
        retry: RetryPolicy,
    ) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // With exactly one trailing slash, `join` appends the search path
        // instead of replacing the last segment of the base.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let search_url = Url::parse(&normalised)
            .and_then(|base| base.join(SEARCH_PATH))
            .map_err(|e| FetchError::InvalidBaseUrl {
                url: base_url.to_owned(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            search_url,
            retry,
        })
    }

    #[cfg(test)]
    pub(crate) fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Searches for `query` and returns the raw JSON response.
    ///
    /// Each attempt is retried according to the client's [`RetryPolicy`].
    /// After a successful response the call sleeps for `delay` before
    /// returning.
    ///
    /// # Errors
    ///
    /// - [`FetchError::Transport`] on network failure after all retries.
    /// - [`FetchError::Upstream`] on a non-2xx status after all retries.
    /// - [`FetchError::Decode`] if the body is not JSON after all retries.
    pub async fn fetch(
        &self,
        query: &SearchQuery,
        delay: Duration,
    ) -> Result<serde_json::Value, FetchError> {
        let url = self.build_url(query);
        tracing::debug!(query = %query.query, %url, "requesting branch search");

        let body = retry_with_policy(&self.retry, || self.request_json(&url)).await?;

        tracing::info!(
            query = %query.query,
            postal_code = %query.postal_code,
            country = %query.country_code,
            "branch search succeeded"
        );

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        Ok(body)
    }

    /// Builds the search URL with percent-encoded `query`, `locality`, and
    /// `country` parameters.
    fn build_url(&self, query: &SearchQuery) -> Url {
        let mut url = self.search_url.clone();
        url.query_pairs_mut()
            .append_pair("query", &query.query)
            .append_pair("locality", &query.postal_code)
            .append_pair("country", &query.country_code);
        url
    }

    /// Sends one GET, requires a 2xx status, and parses the body as JSON.
    async fn request_json(&self, url: &Url) -> Result<serde_json::Value, FetchError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Upstream {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| FetchError::Decode {
            context: url.to_string(),
            source: e,
        })
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
