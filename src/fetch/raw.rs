// src/fetch/raw.rs
// =============================================================================
// The raw fetch primitive: one GET against the autocomplete endpoint.
//
// This layer knows nothing about rate limits or retries. It sends
// `GET <endpoint>?query=<q>` and hands back the status code, the body and
// the Retry-After header if there was one. Only transport problems
// (timeouts, refused connections, ...) are errors here.
// =============================================================================

use async_trait::async_trait;
use reqwest::header::RETRY_AFTER;
use reqwest::Client;
use std::time::Duration;
use url::Url;

use crate::config::Settings;
use crate::error::{FetchError, HarvestError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
    /// Server hint from the Retry-After header, seconds form only
    pub retry_after: Option<Duration>,
}

#[cfg(test)]
impl RawResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
            retry_after: None,
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: String::new(),
            retry_after: None,
        }
    }
}

#[async_trait]
pub trait RawFetch: Send + Sync {
    async fn fetch(&self, query: &str) -> std::result::Result<RawResponse, FetchError>;
}

// reqwest-backed fetcher for one endpoint
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    endpoint: Url,
}

impl HttpFetcher {
    pub fn new(endpoint: &str, settings: &Settings) -> Result<Self> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| HarvestError::config(format!("invalid endpoint '{}': {}", endpoint, e)))?;

        // One client per endpoint so connections are pooled across queries
        let client = Client::builder()
            .timeout(settings.request_timeout())
            .user_agent(settings.user_agent.as_str())
            .build()?;

        Ok(Self { client, endpoint })
    }

    // Builds `<endpoint>?query=<q>` with the query form-encoded. The v3
    // alphabet contains ' ' and '+', which must not reach the server raw.
    fn url_for(&self, query: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("query", query);
        url
    }
}

#[async_trait]
impl RawFetch for HttpFetcher {
    async fn fetch(&self, query: &str) -> std::result::Result<RawResponse, FetchError> {
        let response = self
            .client
            .get(self.url_for(query))
            .send()
            .await
            .map_err(categorize_error)?;

        let status = response.status().as_u16();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_secs);

        let body = response.text().await.map_err(categorize_error)?;

        Ok(RawResponse {
            status,
            body,
            retry_after,
        })
    }
}

// Sorts reqwest errors into the few cases the client cares about
fn categorize_error(error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout
    } else if error.is_connect() {
        FetchError::Connect(error.to_string())
    } else {
        FetchError::Transport(error.to_string())
    }
}
