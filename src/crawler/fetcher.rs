//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with proper user agent strings
//! - GET requests bounded by the configured timeout
//! - Error classification into [`FetchError`]
//!
//! Redirects are followed by the client. There are no retries: a failed
//! page is counted and the crawl moves on.

use crate::config::UserAgentConfig;
use crate::crawler::extractor::Document;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

/// Why a page could not be fetched
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),

    #[error("HTTP status {0}")]
    HttpStatus(u16),
}

impl FetchError {
    fn from_reqwest(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else if let Some(status) = error.status() {
            Self::HttpStatus(status.as_u16())
        } else {
            Self::Network(error.to_string())
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `timeout` - Applied to connecting and to the whole request
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use sumi_sieve::config::UserAgentConfig;
/// use sumi_sieve::crawler::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default(), Duration::from_secs(5)).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    // Format: CrawlerName/Version
    let user_agent = format!("{}/{}", config.crawler_name, config.crawler_version);

    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .connect_timeout(timeout)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches pages with a fixed per-request timeout
pub struct Fetcher {
    client: Client,
    timeout: Duration,
}

impl Fetcher {
    /// Creates a fetcher with its own HTTP client
    pub fn new(config: &UserAgentConfig, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config, timeout)?,
            timeout,
        })
    }

    /// Issues one GET and parses the body
    ///
    /// Any non-2xx status is [`FetchError::HttpStatus`]. A timeout while
    /// connecting or while reading the body is [`FetchError::Timeout`]; a
    /// partially read body is never returned.
    ///
    /// # Arguments
    ///
    /// * `url` - Absolute URL to fetch
    pub async fn fetch(&self, url: &str) -> Result<Document, FetchError> {
        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(FetchError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        let body = response.text().await.map_err(FetchError::from_reqwest)?;
        Ok(Document::parse(&body))
    }
}
