// src/checker/http.rs
// =============================================================================
// This module checks if feed URLs are alive by making HTTP requests.
//
// Key functionality:
// - Makes one GET request per URL with a browser-like User-Agent
//   (some feed hosts reject obvious bots)
// - Short timeout (3 seconds by default) so dead hosts don't stall the run
// - Accepts invalid/self-signed certificates: we only care whether the feed
//   answers, not whether its TLS setup is correct
// - Only HTTP 200 counts as alive; everything else is dead
// - Optionally runs several checks at once with a concurrency limit
//
// Rust concepts:
// - async/await: For network I/O
// - Enums: To represent the different ways a check can fail
// - Streams: For processing many URLs with bounded concurrency
// =============================================================================

use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use reqwest::{Client, ClientBuilder, StatusCode};
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::debug;
use url::Url;

// Pretend to be a desktop browser
pub const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.114 Safari/537.36";

pub const DEFAULT_TIMEOUT_SECS: u64 = 3;

// Represents the outcome of checking one URL
//
// Only `Ok` means the feed is reachable.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UrlStatus {
    /// Server answered 200 OK
    Ok,
    /// Server answered with any other status code
    BadStatus { code: u16 },
    /// No response within the timeout
    Timeout,
    /// TLS handshake failed
    TlsError,
    /// DNS failure, connection refused, reset, ...
    ConnectError,
    /// The URL could not be parsed, no request was made
    InvalidUrl,
    /// The URL was empty, no request was made
    Missing,
    /// Anything else
    Error,
}

// Represents the result of checking a single URL
#[derive(Debug, Clone, Serialize)]
pub struct UrlCheckResult {
    /// The URL as it appears in the OPML file
    pub url: String,
    #[serde(flatten)]
    pub status: UrlStatus,
    /// Optional message with more details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl UrlCheckResult {
    fn new(url: &str, status: UrlStatus, message: Option<String>) -> Self {
        UrlCheckResult {
            url: url.to_string(),
            status,
            message,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == UrlStatus::Ok
    }
}

// Settings for the HTTP client
#[derive(Debug, Clone)]
pub struct CheckOptions {
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for CheckOptions {
    fn default() -> Self {
        CheckOptions {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: USER_AGENT.to_string(),
        }
    }
}

fn client_builder(options: &CheckOptions) -> ClientBuilder {
    Client::builder()
        .timeout(options.timeout)
        .user_agent(options.user_agent.as_str())
        .danger_accept_invalid_certs(true)
}

// Creates the HTTP client shared by every check in a run
//
// Reusing one client gives us connection pooling for feeds on the same host.
pub fn build_client(options: &CheckOptions) -> Result<Client> {
    client_builder(options)
        .build()
        .context("failed to create HTTP client")
}

// Adds "http://" to URLs that don't start with "http"
//
// Returns None for empty input.
pub fn normalize_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if trimmed.starts_with("http") {
        Some(trimmed.to_string())
    } else {
        Some(format!("http://{}", trimmed))
    }
}

// Checks a single URL
//
// Never fails: every problem becomes a UrlStatus. Nothing is printed here;
// callers print `failure_line` next to the entry the URL belongs to.
pub async fn check_url(client: &Client, url: &str) -> UrlCheckResult {
    let Some(target) = normalize_url(url) else {
        return UrlCheckResult::new(url, UrlStatus::Missing, Some("Empty URL".to_string()));
    };

    let result = match Url::parse(&target) {
        Ok(parsed) => fetch(client, url, parsed).await,
        Err(e) => UrlCheckResult::new(url, UrlStatus::InvalidUrl, Some(e.to_string())),
    };

    result
}

async fn fetch(client: &Client, url: &str, target: Url) -> UrlCheckResult {
    debug!(url = %target, "sending GET");
    let started = Instant::now();

    let result = match client.get(target).send().await {
        Ok(response) => analyze_response(url, response.status()),
        Err(e) => categorize_error(url, e),
    };

    debug!(
        url,
        elapsed_ms = started.elapsed().as_millis() as u64,
        status = ?result.status,
        "check finished"
    );
    result
}

// Checks many URLs, at most `concurrency` at a time
//
// Results come back in completion order, not input order.
pub async fn check_urls(client: &Client, urls: Vec<String>, concurrency: usize) -> Vec<UrlCheckResult> {
    stream::iter(urls)
        .map(|url| async move { check_url(client, &url).await })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await
}

fn analyze_response(url: &str, status_code: StatusCode) -> UrlCheckResult {
    let message = Some(format!("HTTP {}", status_code.as_u16()));

    if status_code == StatusCode::OK {
        UrlCheckResult::new(url, UrlStatus::Ok, message)
    } else {
        // Even other 2xx codes count as dead, the feed should serve 200
        UrlCheckResult::new(
            url,
            UrlStatus::BadStatus {
                code: status_code.as_u16(),
            },
            message,
        )
    }
}

// Categorizes different error types from reqwest
//
// The top-level reqwest message is often just "error sending request", so
// we look at the whole source chain to tell TLS failures apart.
fn categorize_error(url: &str, error: reqwest::Error) -> UrlCheckResult {
    // The URL is printed next to the message anyway
    let error = error.without_url();
    let details = error_chain(&error);
    let lowered = details.to_lowercase();

    let status = if error.is_timeout() {
        UrlStatus::Timeout
    } else if lowered.contains("certificate") || lowered.contains("tls") || lowered.contains("ssl") {
        UrlStatus::TlsError
    } else if error.is_connect() {
        UrlStatus::ConnectError
    } else if error.is_builder() {
        UrlStatus::InvalidUrl
    } else {
        UrlStatus::Error
    };

    UrlCheckResult::new(url, status, Some(details))
}

fn error_chain(error: &reqwest::Error) -> String {
    let mut message = error.to_string();
    let mut source = std::error::Error::source(error);
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = std::error::Error::source(inner);
    }
    message
}

// The one-line message for a dead URL, None when it is reachable
pub fn failure_line(result: &UrlCheckResult) -> Option<String> {
    let details = result.message.as_deref().unwrap_or("");
    let url = &result.url;
    match &result.status {
        UrlStatus::Ok => None,
        UrlStatus::BadStatus { code } => Some(format!("[-] Bad status {}: {}", code, url)),
        UrlStatus::Timeout => Some(format!("[-] Timeout: {}", url)),
        UrlStatus::TlsError => Some(format!("[-] TLS error {}: {}", details, url)),
        UrlStatus::ConnectError => Some(format!("[-] Connection error {}: {}", details, url)),
        UrlStatus::InvalidUrl => Some(format!("[-] Invalid URL {}: {}", details, url)),
        UrlStatus::Missing => None,
        UrlStatus::Error => Some(format!("[-] Error {}: {}", details, url)),
    }
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why GET and not HEAD?
//    - Plenty of feed servers answer HEAD with 405 or 404
//    - GET without reading the body is nearly as cheap
//
// 2. What does danger_accept_invalid_certs do?
//    - Skips certificate validation entirely
//    - Fine here: we only ask "does this server answer?", we never trust
//      or store what it sends back
//
// 3. Why `async move` in check_urls?
//    - Each future owns its URL String
//    - `client` is a &Client, and moving a reference just copies it
// -----------------------------------------------------------------------------

// Same settings as build_client, but never routed through a proxy
#[cfg(test)]
pub(crate) fn test_client(timeout: Duration) -> Client {
    let options = CheckOptions {
        timeout,
        ..CheckOptions::default()
    };
    client_builder(&options)
        .no_proxy()
        .build()
        .expect("test client")
}
