//! HTTP fetcher implementation
//!
//! This module handles catalog page requests, including:
//! - Building the shared HTTP client with the identifying user agent
//! - GET requests bounded by a per-request timeout
//! - Classifying failures into HTTP status failures and transport failures

use crate::config::HttpConfig;
use reqwest::Client;
use std::time::Duration;

/// Result of a page fetch
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched the page
    Success {
        /// Page body content
        body: String,
    },

    /// Server answered with a non-success status
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// Network error (connection refused, timeout, truncated body, etc.)
    NetworkError {
        /// Error description
        error: String,
    },
}

/// Builds an HTTP client with proper configuration
///
/// No client-wide timeout is set; page and archive fetches each apply their
/// own per-request timeout.
///
/// # Example
///
/// ```no_run
/// use jar_harvest::catalog::build_http_client;
/// use jar_harvest::config::HttpConfig;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a page as text
///
/// # Error Classification
///
/// | Condition | Result |
/// |-----------|--------|
/// | 2xx | Success |
/// | Any other status | HttpError |
/// | Timeout | NetworkError ("Request timeout") |
/// | Connection / body failure | NetworkError (error text) |
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The URL to fetch
/// * `timeout` - Upper bound for the whole request including the body
pub async fn fetch_url(client: &Client, url: &str, timeout: Duration) -> FetchResult {
    let response = match client.get(url).timeout(timeout).send().await {
        Ok(response) => response,
        Err(e) => return classify_error(e),
    };

    let status = response.status();

    if !status.is_success() {
        return FetchResult::HttpError {
            status_code: status.as_u16(),
        };
    }

    match response.text().await {
        Ok(body) => FetchResult::Success { body },
        Err(e) => classify_error(e),
    }
}

fn classify_error(e: reqwest::Error) -> FetchResult {
    if e.is_timeout() {
        FetchResult::NetworkError {
            error: "Request timeout".to_string(),
        }
    } else {
        FetchResult::NetworkError {
            error: e.to_string(),
        }
    }
}
